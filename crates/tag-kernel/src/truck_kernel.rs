//! TruckKernel — real geometry kernel wrapping the truck B-rep stack.

use std::collections::HashMap;
use std::f64::consts::PI;

// Import truck types selectively to avoid shadowing std::result::Result
use truck_modeling::builder;
use truck_modeling::geometry::{Curve, Line};
use truck_modeling::topology::{Edge, Solid, Vertex, Wire};
use truck_modeling::{Matrix4, Point3, Rad, Vector3};

use crate::profile::{signed_area, Profile};
use crate::tessellation;
use crate::traits::Kernel;
use crate::types::{KernelError, SolidHandle, TriMesh};

/// Tolerance handed to truck's boolean operators.
const BOOLEAN_TOLERANCE: f64 = 0.01;

/// Real geometry kernel backed by the truck BREP library.
pub struct TruckKernel {
    next_handle: u64,
    solids: HashMap<u64, Solid>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            solids: HashMap::new(),
        }
    }

    fn store(&mut self, solid: Solid) -> SolidHandle {
        let handle = SolidHandle(self.next_handle);
        self.next_handle += 1;
        self.solids.insert(handle.id(), solid);
        handle
    }

    fn get(&self, handle: &SolidHandle) -> Result<&Solid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::SolidNotFound { id: handle.id() })
    }

    /// Build the boundary wires of a profile at the given z.
    fn profile_wires(&self, profile: &Profile, z: f64) -> Result<Vec<Wire>, KernelError> {
        match profile {
            Profile::Rect { cx, cy, w, h } => {
                let (hw, hh) = (w / 2.0, h / 2.0);
                let pts = [
                    Point3::new(cx - hw, cy - hh, z),
                    Point3::new(cx + hw, cy - hh, z),
                    Point3::new(cx + hw, cy + hh, z),
                    Point3::new(cx - hw, cy + hh, z),
                ];
                Ok(vec![line_wire(&pts)])
            }
            Profile::RoundedRect { cx, cy, w, h, r } => {
                if *r <= 0.0 {
                    return self.profile_wires(
                        &Profile::Rect {
                            cx: *cx,
                            cy: *cy,
                            w: *w,
                            h: *h,
                        },
                        z,
                    );
                }
                if 2.0 * r >= w.min(*h) {
                    return Err(KernelError::ProfileFailed {
                        reason: format!("corner radius {r} too large for {w} x {h} outline"),
                    });
                }
                Ok(vec![rounded_rect_wire(*cx, *cy, *w, *h, *r, z)])
            }
            Profile::Circle { cx, cy, d } => {
                if *d <= 0.0 {
                    return Err(KernelError::ProfileFailed {
                        reason: format!("circle diameter must be positive, got {d}"),
                    });
                }
                Ok(vec![circle_wire(*cx, *cy, d / 2.0, z)])
            }
            Profile::Slot { cx, cy, w, l } => {
                if *w <= 0.0 {
                    return Err(KernelError::ProfileFailed {
                        reason: format!("slot width must be positive, got {w}"),
                    });
                }
                if *l <= *w {
                    // Caps overlap: the slot degenerates to its end circle.
                    return Ok(vec![circle_wire(*cx, *cy, w / 2.0, z)]);
                }
                Ok(vec![slot_wire(*cx, *cy, *w, *l, z)])
            }
            Profile::Polygon { outer, holes } => {
                if outer.len() < 3 {
                    return Err(KernelError::ProfileFailed {
                        reason: "polygon outer ring has fewer than 3 points".to_string(),
                    });
                }
                let mut wires = Vec::with_capacity(1 + holes.len());
                wires.push(polygon_wire(outer, z, true));
                for hole in holes {
                    if hole.len() < 3 {
                        return Err(KernelError::ProfileFailed {
                            reason: "polygon hole has fewer than 3 points".to_string(),
                        });
                    }
                    wires.push(polygon_wire(hole, z, false));
                }
                Ok(wires)
            }
        }
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for TruckKernel {
    fn extrude(
        &mut self,
        profile: &Profile,
        base_z: f64,
        height: f64,
    ) -> Result<SolidHandle, KernelError> {
        if height == 0.0 {
            return Err(KernelError::ProfileFailed {
                reason: "extrusion height must be non-zero".to_string(),
            });
        }
        // Normalize to an upward sweep so face orientation stays outward.
        let (base_z, height) = if height < 0.0 {
            (base_z + height, -height)
        } else {
            (base_z, height)
        };

        let wires = self.profile_wires(profile, base_z)?;
        let face = builder::try_attach_plane(&wires).map_err(|e| KernelError::ProfileFailed {
            reason: format!("failed to create planar face: {e}"),
        })?;
        let solid = builder::tsweep(&face, Vector3::new(0.0, 0.0, height));
        Ok(self.store(solid))
    }

    fn union(&mut self, a: &SolidHandle, b: &SolidHandle) -> Result<SolidHandle, KernelError> {
        let solid_a = self.get(a)?.clone();
        let solid_b = self.get(b)?.clone();
        let result = truck_shapeops::or(&solid_a, &solid_b, BOOLEAN_TOLERANCE)
            .or_else(|| {
                // or() yields None when the bodies share no intersection
                // curve; disjoint or flush-touching bodies combine as a
                // multi-shell solid instead.
                let mut shells = solid_a.boundaries().to_vec();
                shells.extend(solid_b.boundaries().to_vec());
                Solid::try_new(shells).ok()
            })
            .ok_or_else(|| KernelError::BooleanFailed {
                reason: "truck or() returned None".to_string(),
            })?;
        Ok(self.store(result))
    }

    fn subtract(&mut self, a: &SolidHandle, b: &SolidHandle) -> Result<SolidHandle, KernelError> {
        let solid_a = self.get(a)?.clone();
        let mut solid_b = self.get(b)?.clone();

        // Subtraction = A ∩ ¬B. not() mutates in place.
        solid_b.not();
        let result = truck_shapeops::and(&solid_a, &solid_b, BOOLEAN_TOLERANCE).ok_or_else(
            || KernelError::BooleanFailed {
                reason: "truck and() returned None for subtraction".to_string(),
            },
        )?;
        Ok(self.store(result))
    }

    fn intersect(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let solid_a = self.get(a)?.clone();
        let solid_b = self.get(b)?.clone();
        let result = truck_shapeops::and(&solid_a, &solid_b, BOOLEAN_TOLERANCE).ok_or_else(
            || KernelError::BooleanFailed {
                reason: "truck and() returned None".to_string(),
            },
        )?;
        Ok(self.store(result))
    }

    fn translate(
        &mut self,
        solid: &SolidHandle,
        offset: [f64; 3],
    ) -> Result<SolidHandle, KernelError> {
        let s = self.get(solid)?.clone();
        let moved = builder::translated(&s, Vector3::new(offset[0], offset[1], offset[2]));
        Ok(self.store(moved))
    }

    fn mirror_x(&mut self, solid: &SolidHandle) -> Result<SolidHandle, KernelError> {
        let s = self.get(solid)?.clone();
        // A reflection turns the solid inside out; not() restores outward
        // orientation.
        let mut mirrored = builder::transformed(&s, Matrix4::from_nonuniform_scale(-1.0, 1.0, 1.0));
        mirrored.not();
        Ok(self.store(mirrored))
    }

    fn fillet_top_edges(
        &mut self,
        _solid: &SolidHandle,
        _radius: f64,
    ) -> Result<SolidHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "fillet_top_edges".to_string(),
        })
    }

    fn tessellate(
        &mut self,
        solid: &SolidHandle,
        tolerance: f64,
    ) -> Result<TriMesh, KernelError> {
        let truck_solid = self.get(solid)?;
        tessellation::tessellate_solid(truck_solid, tolerance)
    }
}

/// Closed wire of straight segments through the given points.
fn line_wire(pts: &[Point3]) -> Wire {
    let n = pts.len();
    let vertices: Vec<Vertex> = pts.iter().map(|&p| builder::vertex(p)).collect();
    let mut edges: Vec<Edge> = Vec::with_capacity(n);
    for i in 0..n {
        let j = (i + 1) % n;
        edges.push(Edge::new(
            &vertices[i],
            &vertices[j],
            Curve::Line(Line(pts[i], pts[j])),
        ));
    }
    Wire::from_iter(edges)
}

/// Counter-clockwise rounded-rectangle wire: four lines joined by four
/// quarter arcs, each arc passing through its 45-degree transit point.
fn rounded_rect_wire(cx: f64, cy: f64, w: f64, h: f64, r: f64, z: f64) -> Wire {
    let (hw, hh) = (w / 2.0, h / 2.0);
    let k = r * std::f64::consts::FRAC_1_SQRT_2;

    let pts = [
        Point3::new(cx - hw + r, cy - hh, z),
        Point3::new(cx + hw - r, cy - hh, z),
        Point3::new(cx + hw, cy - hh + r, z),
        Point3::new(cx + hw, cy + hh - r, z),
        Point3::new(cx + hw - r, cy + hh, z),
        Point3::new(cx - hw + r, cy + hh, z),
        Point3::new(cx - hw, cy + hh - r, z),
        Point3::new(cx - hw, cy - hh + r, z),
    ];
    // Corner centers, in the order the arcs are traversed.
    let corners = [
        (cx + hw - r, cy - hh + r, 1.0, -1.0),
        (cx + hw - r, cy + hh - r, 1.0, 1.0),
        (cx - hw + r, cy + hh - r, -1.0, 1.0),
        (cx - hw + r, cy - hh + r, -1.0, -1.0),
    ];

    let vertices: Vec<Vertex> = pts.iter().map(|&p| builder::vertex(p)).collect();
    let mut edges: Vec<Edge> = Vec::with_capacity(8);
    for i in 0..4 {
        let a = 2 * i;
        let b = 2 * i + 1;
        let c = (2 * i + 2) % 8;
        edges.push(Edge::new(
            &vertices[a],
            &vertices[b],
            Curve::Line(Line(pts[a], pts[b])),
        ));
        let (ccx, ccy, sx, sy) = corners[i];
        let transit = Point3::new(ccx + sx * k, ccy + sy * k, z);
        edges.push(builder::circle_arc(&vertices[b], &vertices[c], transit));
    }
    Wire::from_iter(edges)
}

/// Closed circular wire from a rotational sweep of one vertex.
fn circle_wire(cx: f64, cy: f64, r: f64, z: f64) -> Wire {
    let v = builder::vertex(Point3::new(cx + r, cy, z));
    builder::rsweep(
        &v,
        Point3::new(cx, cy, z),
        Vector3::unit_z(),
        Rad(2.0 * PI),
    )
}

/// Vertical stadium wire: two straight edges capped by semicircular arcs at
/// top and bottom.
fn slot_wire(cx: f64, cy: f64, w: f64, l: f64, z: f64) -> Wire {
    let r = w / 2.0;
    let hs = (l - w) / 2.0;
    let pts = [
        Point3::new(cx + r, cy - hs, z),
        Point3::new(cx + r, cy + hs, z),
        Point3::new(cx - r, cy + hs, z),
        Point3::new(cx - r, cy - hs, z),
    ];
    let vertices: Vec<Vertex> = pts.iter().map(|&p| builder::vertex(p)).collect();
    let edges = vec![
        Edge::new(&vertices[0], &vertices[1], Curve::Line(Line(pts[0], pts[1]))),
        builder::circle_arc(&vertices[1], &vertices[2], Point3::new(cx, cy + l / 2.0, z)),
        Edge::new(&vertices[2], &vertices[3], Curve::Line(Line(pts[2], pts[3]))),
        builder::circle_arc(&vertices[3], &vertices[0], Point3::new(cx, cy - l / 2.0, z)),
    ];
    Wire::from_iter(edges)
}

/// Polygon ring wire. Outer rings are normalized counter-clockwise, holes
/// clockwise, so `try_attach_plane` sees consistent orientations.
fn polygon_wire(ring: &[[f64; 2]], z: f64, outer: bool) -> Wire {
    let ccw = signed_area(ring) > 0.0;
    let reversed: Vec<[f64; 2]>;
    let ring = if ccw == outer {
        ring
    } else {
        reversed = ring.iter().rev().copied().collect();
        &reversed
    };
    let pts: Vec<Point3> = ring.iter().map(|p| Point3::new(p[0], p[1], z)).collect();
    line_wire(&pts)
}
