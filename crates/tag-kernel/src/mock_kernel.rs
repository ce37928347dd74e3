//! MockKernel — deterministic test double implementing [`Kernel`].
//!
//! Every solid is a set of axis-aligned boxes: extrusion yields the
//! profile's bounding box, union concatenates, subtraction keeps the left
//! operand and counts the cut, rigid moves transform box coordinates
//! exactly. Tessellation emits each box as a closed 12-triangle mesh, so
//! meshes built from disjoint boxes pass the same integrity checks real
//! geometry must pass.

use std::collections::HashMap;

use crate::profile::Profile;
use crate::traits::Kernel;
use crate::types::{KernelError, SolidHandle, TriMesh};

/// An axis-aligned box, the mock kernel's only primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Box3 {
    pub fn center(&self) -> [f64; 3] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }

    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

#[derive(Debug, Clone, Default)]
struct MockSolid {
    boxes: Vec<Box3>,
    cut_count: usize,
}

/// Deterministic test double for the geometry kernel.
pub struct MockKernel {
    next_handle: u64,
    solids: HashMap<u64, MockSolid>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            solids: HashMap::new(),
        }
    }

    fn store(&mut self, solid: MockSolid) -> SolidHandle {
        let handle = SolidHandle(self.next_handle);
        self.next_handle += 1;
        self.solids.insert(handle.id(), solid);
        handle
    }

    fn get(&self, handle: &SolidHandle) -> Result<&MockSolid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::SolidNotFound { id: handle.id() })
    }

    /// The boxes making up a solid, for structural assertions in tests.
    pub fn boxes(&self, handle: &SolidHandle) -> Option<&[Box3]> {
        self.solids.get(&handle.id()).map(|s| s.boxes.as_slice())
    }

    /// How many subtractions were applied while building a solid.
    pub fn cut_count(&self, handle: &SolidHandle) -> Option<usize> {
        self.solids.get(&handle.id()).map(|s| s.cut_count)
    }

    /// Overall bounds of a solid as (min, max), if it has any boxes.
    pub fn bounding_box(&self, handle: &SolidHandle) -> Option<([f64; 3], [f64; 3])> {
        let solid = self.solids.get(&handle.id())?;
        let mut min = [f64::MAX; 3];
        let mut max = [f64::MIN; 3];
        for b in &solid.boxes {
            for i in 0..3 {
                min[i] = min[i].min(b.min[i]);
                max[i] = max[i].max(b.max[i]);
            }
        }
        if solid.boxes.is_empty() {
            None
        } else {
            Some((min, max))
        }
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for MockKernel {
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
        let (z0, z1) = if height < 0.0 {
            (base_z + height, base_z)
        } else {
            (base_z, base_z + height)
        };
        let (x0, y0, x1, y1) = profile.bounds();
        let solid = MockSolid {
            boxes: vec![Box3 {
                min: [x0, y0, z0],
                max: [x1, y1, z1],
            }],
            cut_count: 0,
        };
        Ok(self.store(solid))
    }

    fn union(&mut self, a: &SolidHandle, b: &SolidHandle) -> Result<SolidHandle, KernelError> {
        let sa = self.get(a)?.clone();
        let sb = self.get(b)?.clone();
        let mut boxes = sa.boxes;
        boxes.extend(sb.boxes);
        Ok(self.store(MockSolid {
            boxes,
            cut_count: sa.cut_count + sb.cut_count,
        }))
    }

    fn subtract(&mut self, a: &SolidHandle, b: &SolidHandle) -> Result<SolidHandle, KernelError> {
        let sa = self.get(a)?.clone();
        self.get(b)?;
        Ok(self.store(MockSolid {
            boxes: sa.boxes,
            cut_count: sa.cut_count + 1,
        }))
    }

    fn intersect(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let bounds_a = self.bounding_box(a).ok_or(KernelError::BooleanFailed {
            reason: "intersect on empty solid".to_string(),
        })?;
        let bounds_b = self.bounding_box(b).ok_or(KernelError::BooleanFailed {
            reason: "intersect on empty solid".to_string(),
        })?;

        let mut min = [0.0; 3];
        let mut max = [0.0; 3];
        for i in 0..3 {
            min[i] = bounds_a.0[i].max(bounds_b.0[i]);
            max[i] = bounds_a.1[i].min(bounds_b.1[i]);
        }
        let boxes = if (0..3).all(|i| min[i] < max[i]) {
            vec![Box3 { min, max }]
        } else {
            Vec::new()
        };
        Ok(self.store(MockSolid {
            boxes,
            cut_count: 0,
        }))
    }

    fn translate(
        &mut self,
        solid: &SolidHandle,
        offset: [f64; 3],
    ) -> Result<SolidHandle, KernelError> {
        let s = self.get(solid)?.clone();
        let boxes = s
            .boxes
            .into_iter()
            .map(|b| Box3 {
                min: [
                    b.min[0] + offset[0],
                    b.min[1] + offset[1],
                    b.min[2] + offset[2],
                ],
                max: [
                    b.max[0] + offset[0],
                    b.max[1] + offset[1],
                    b.max[2] + offset[2],
                ],
            })
            .collect();
        Ok(self.store(MockSolid {
            boxes,
            cut_count: s.cut_count,
        }))
    }

    fn mirror_x(&mut self, solid: &SolidHandle) -> Result<SolidHandle, KernelError> {
        let s = self.get(solid)?.clone();
        let boxes = s
            .boxes
            .into_iter()
            .map(|b| Box3 {
                min: [-b.max[0], b.min[1], b.min[2]],
                max: [-b.min[0], b.max[1], b.max[2]],
            })
            .collect();
        Ok(self.store(MockSolid {
            boxes,
            cut_count: s.cut_count,
        }))
    }

    fn fillet_top_edges(
        &mut self,
        solid: &SolidHandle,
        radius: f64,
    ) -> Result<SolidHandle, KernelError> {
        if radius <= 0.0 {
            return Err(KernelError::Other {
                message: "fillet radius must be positive".to_string(),
            });
        }
        // Cosmetic only: box geometry is unchanged.
        let s = self.get(solid)?.clone();
        Ok(self.store(s))
    }

    fn tessellate(
        &mut self,
        solid: &SolidHandle,
        _tolerance: f64,
    ) -> Result<TriMesh, KernelError> {
        let s = self.get(solid)?;
        if s.boxes.is_empty() {
            return Err(KernelError::TessellationFailed {
                reason: "solid has no volume".to_string(),
            });
        }
        let mut mesh = TriMesh::default();
        for b in &s.boxes {
            mesh.append(&box_mesh(b));
        }
        Ok(mesh)
    }
}

/// Closed 12-triangle mesh of one box, wound counter-clockwise seen from
/// outside.
fn box_mesh(b: &Box3) -> TriMesh {
    let [x0, y0, z0] = b.min;
    let [x1, y1, z1] = b.max;
    let corners = [
        [x0, y0, z0],
        [x1, y0, z0],
        [x1, y1, z0],
        [x0, y1, z0],
        [x0, y0, z1],
        [x1, y0, z1],
        [x1, y1, z1],
        [x0, y1, z1],
    ];
    let mut vertices = Vec::with_capacity(24);
    for c in corners {
        vertices.push(c[0] as f32);
        vertices.push(c[1] as f32);
        vertices.push(c[2] as f32);
    }
    let indices = vec![
        0, 2, 1, 0, 3, 2, // bottom, normal -z
        4, 5, 6, 4, 6, 7, // top, +z
        0, 1, 5, 0, 5, 4, // front, -y
        2, 3, 7, 2, 7, 6, // back, +y
        3, 0, 4, 3, 4, 7, // left, -x
        1, 2, 6, 1, 6, 5, // right, +x
    ];
    TriMesh { vertices, indices }
}
