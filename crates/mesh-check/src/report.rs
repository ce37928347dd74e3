//! Mesh validation and health reporting.

use std::collections::HashSet;

use tag_kernel::TriMesh;

use crate::adjacency::MeshAdjacency;
use crate::intersect::self_intersection_count;

/// Report of mesh validation results.
#[derive(Debug, Clone, Default)]
pub struct MeshReport {
    pub vertex_count: usize,
    pub face_count: usize,
    pub edge_count: usize,

    /// Edges with only one adjacent triangle (holes).
    pub boundary_edge_count: usize,
    /// Edges with more than two adjacent triangles.
    pub non_manifold_edge_count: usize,
    /// Triangles with near-zero area.
    pub degenerate_face_count: usize,
    /// Triangles appearing more than once (either winding).
    pub duplicate_face_count: usize,
    /// NaN or infinite coordinate values.
    pub non_finite_count: usize,
    /// Properly crossing triangle pairs.
    pub self_intersection_count: usize,

    pub is_empty: bool,
    pub is_watertight: bool,
    pub is_manifold: bool,
    /// Majority of signed volume is negative: the surface faces inward.
    pub is_inside_out: bool,
}

impl MeshReport {
    /// Whether the mesh can go to a printer: closed, manifold, outward
    /// wound, finite, with no degenerate or crossing triangles.
    #[must_use]
    pub fn is_printable(&self) -> bool {
        !self.is_empty
            && self.is_watertight
            && self.is_manifold
            && !self.is_inside_out
            && self.non_finite_count == 0
            && self.degenerate_face_count == 0
            && self.self_intersection_count == 0
    }

    /// First failed check, for error messages that name the violation.
    #[must_use]
    pub fn first_failure(&self) -> Option<&'static str> {
        if self.is_empty {
            Some("mesh is empty")
        } else if self.non_finite_count > 0 {
            Some("mesh contains NaN or infinite coordinates")
        } else if !self.is_watertight {
            Some("mesh is not watertight")
        } else if !self.is_manifold {
            Some("mesh has non-manifold edges")
        } else if self.is_inside_out {
            Some("mesh winding is inside-out")
        } else if self.degenerate_face_count > 0 {
            Some("mesh has degenerate triangles")
        } else if self.self_intersection_count > 0 {
            Some("mesh is self-intersecting")
        } else {
            None
        }
    }
}

impl std::fmt::Display for MeshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mesh report:")?;
        writeln!(
            f,
            "  vertices {}  faces {}  edges {}",
            self.vertex_count, self.face_count, self.edge_count
        )?;
        writeln!(
            f,
            "  watertight: {}  manifold: {}  winding: {}",
            if self.is_watertight { "yes" } else { "no" },
            if self.is_manifold { "yes" } else { "no" },
            if self.is_inside_out {
                "inside-out"
            } else {
                "correct"
            }
        )?;
        if self.boundary_edge_count > 0 {
            writeln!(f, "  boundary edges: {}", self.boundary_edge_count)?;
        }
        if self.non_manifold_edge_count > 0 {
            writeln!(f, "  non-manifold edges: {}", self.non_manifold_edge_count)?;
        }
        if self.degenerate_face_count > 0 {
            writeln!(f, "  degenerate triangles: {}", self.degenerate_face_count)?;
        }
        if self.duplicate_face_count > 0 {
            writeln!(f, "  duplicate triangles: {}", self.duplicate_face_count)?;
        }
        if self.non_finite_count > 0 {
            writeln!(f, "  non-finite coordinates: {}", self.non_finite_count)?;
        }
        if self.self_intersection_count > 0 {
            writeln!(f, "  self-intersections: {}", self.self_intersection_count)?;
        }
        Ok(())
    }
}

/// Options for mesh validation.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Area below which a triangle counts as degenerate.
    pub degenerate_area_threshold: f64,
    /// Run the O(n·k) self-intersection scan.
    pub check_self_intersection: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            degenerate_area_threshold: 1e-12,
            check_self_intersection: true,
        }
    }
}

/// Validate a mesh with default options.
#[must_use]
pub fn validate_mesh(mesh: &TriMesh) -> MeshReport {
    validate_mesh_with_options(mesh, &ValidationOptions::default())
}

/// Validate a mesh and return a report of any issues.
#[must_use]
pub fn validate_mesh_with_options(mesh: &TriMesh, options: &ValidationOptions) -> MeshReport {
    let adjacency = MeshAdjacency::build(mesh);

    let non_finite_count = mesh.vertices.iter().filter(|v| !v.is_finite()).count();
    let degenerate_face_count =
        count_degenerate_faces(mesh, options.degenerate_area_threshold);
    let duplicate_face_count = count_duplicate_faces(mesh, &adjacency);
    let is_inside_out = !mesh.is_empty() && signed_volume(mesh) < 0.0;
    let self_intersections = if options.check_self_intersection && non_finite_count == 0 {
        self_intersection_count(mesh, &adjacency)
    } else {
        0
    };

    MeshReport {
        vertex_count: adjacency.vertex_count(),
        face_count: mesh.triangle_count(),
        edge_count: adjacency.edge_count(),
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        degenerate_face_count,
        duplicate_face_count,
        non_finite_count,
        self_intersection_count: self_intersections,
        is_empty: mesh.is_empty(),
        is_watertight: !mesh.is_empty() && adjacency.is_watertight(),
        is_manifold: adjacency.is_manifold(),
        is_inside_out,
    }
}

/// Axis-aligned bounds of a mesh as (min, max), `None` when empty.
#[must_use]
pub fn bounding_box(mesh: &TriMesh) -> Option<([f64; 3], [f64; 3])> {
    if mesh.vertex_count() == 0 {
        return None;
    }
    let mut min = [f64::MAX; 3];
    let mut max = [f64::MIN; 3];
    for i in 0..mesh.vertex_count() as u32 {
        let v = mesh.vertex(i);
        for k in 0..3 {
            let c = f64::from(v[k]);
            min[k] = min[k].min(c);
            max[k] = max[k].max(c);
        }
    }
    Some((min, max))
}

fn count_degenerate_faces(mesh: &TriMesh, area_threshold: f64) -> usize {
    mesh.indices
        .chunks(3)
        .filter(|tri| {
            let v0 = mesh.vertex(tri[0]);
            let v1 = mesh.vertex(tri[1]);
            let v2 = mesh.vertex(tri[2]);
            let e1 = [
                f64::from(v1[0] - v0[0]),
                f64::from(v1[1] - v0[1]),
                f64::from(v1[2] - v0[2]),
            ];
            let e2 = [
                f64::from(v2[0] - v0[0]),
                f64::from(v2[1] - v0[1]),
                f64::from(v2[2] - v0[2]),
            ];
            let cx = e1[1] * e2[2] - e1[2] * e2[1];
            let cy = e1[2] * e2[0] - e1[0] * e2[2];
            let cz = e1[0] * e2[1] - e1[1] * e2[0];
            (cx * cx + cy * cy + cz * cz).sqrt() * 0.5 < area_threshold
        })
        .count()
}

fn count_duplicate_faces(mesh: &TriMesh, adjacency: &MeshAdjacency) -> usize {
    let mut seen: HashSet<[u32; 3]> = HashSet::new();
    let mut duplicates = 0;
    for f in 0..mesh.triangle_count() {
        let face = adjacency.face_canonical(mesh, f);
        let normalized = normalize_face(face);
        let reversed = normalize_face([face[0], face[2], face[1]]);
        if seen.contains(&normalized) || seen.contains(&reversed) {
            duplicates += 1;
        } else {
            seen.insert(normalized);
        }
    }
    duplicates
}

/// Rotate a face so the smallest vertex id comes first, preserving winding.
fn normalize_face(face: [u32; 3]) -> [u32; 3] {
    let min_idx = if face[0] <= face[1] && face[0] <= face[2] {
        0
    } else if face[1] <= face[2] {
        1
    } else {
        2
    };
    [
        face[min_idx],
        face[(min_idx + 1) % 3],
        face[(min_idx + 2) % 3],
    ]
}

/// Signed volume via the divergence theorem. Negative means inward-facing.
fn signed_volume(mesh: &TriMesh) -> f64 {
    let mut volume = 0.0;
    for tri in mesh.indices.chunks(3) {
        let v0 = mesh.vertex(tri[0]);
        let v1 = mesh.vertex(tri[1]);
        let v2 = mesh.vertex(tri[2]);
        let (x0, y0, z0) = (f64::from(v0[0]), f64::from(v0[1]), f64::from(v0[2]));
        let (x1, y1, z1) = (f64::from(v1[0]), f64::from(v1[1]), f64::from(v1[2]));
        let (x2, y2, z2) = (f64::from(v2[0]), f64::from(v2[1]), f64::from(v2[2]));
        volume += x0 * (y1 * z2 - y2 * z1) + x1 * (y2 * z0 - y0 * z2) + x2 * (y0 * z1 - y1 * z0);
    }
    volume / 6.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> TriMesh {
        TriMesh {
            vertices: vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                0.5, 0.866, 0.0, //
                0.5, 0.289, 0.816,
            ],
            indices: vec![
                0, 2, 1, // bottom
                0, 1, 3, // front
                1, 2, 3, // right
                2, 0, 3, // left
            ],
        }
    }

    #[test]
    fn tetrahedron_is_printable() {
        let report = validate_mesh(&tetrahedron());
        assert!(report.is_watertight);
        assert!(report.is_manifold);
        assert!(!report.is_inside_out);
        assert_eq!(report.self_intersection_count, 0);
        assert!(report.is_printable());
        assert_eq!(report.first_failure(), None);
    }

    #[test]
    fn inverted_tetrahedron_reports_inside_out() {
        let mut mesh = tetrahedron();
        for tri in mesh.indices.chunks_mut(3) {
            tri.swap(1, 2);
        }
        let report = validate_mesh(&mesh);
        assert!(report.is_inside_out);
        assert!(!report.is_printable());
    }

    #[test]
    fn open_triangle_fails_watertight() {
        let mesh = TriMesh {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            indices: vec![0, 1, 2],
        };
        let report = validate_mesh(&mesh);
        assert!(!report.is_watertight);
        assert_eq!(report.first_failure(), Some("mesh is not watertight"));
    }

    #[test]
    fn nan_coordinates_detected() {
        let mesh = TriMesh {
            vertices: vec![0.0, 0.0, 0.0, f32::NAN, 0.0, 0.0, 0.0, 1.0, 0.0],
            indices: vec![0, 1, 2],
        };
        let report = validate_mesh(&mesh);
        assert_eq!(report.non_finite_count, 1);
        assert!(!report.is_printable());
    }

    #[test]
    fn collinear_triangle_is_degenerate() {
        let mesh = TriMesh {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0],
            indices: vec![0, 1, 2],
        };
        let report = validate_mesh(&mesh);
        assert_eq!(report.degenerate_face_count, 1);
    }

    #[test]
    fn duplicate_face_detected_reversed() {
        let mut mesh = TriMesh {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            indices: vec![0, 1, 2],
        };
        mesh.indices.extend_from_slice(&[0, 2, 1]);
        let report = validate_mesh(&mesh);
        assert_eq!(report.duplicate_face_count, 1);
    }

    #[test]
    fn empty_mesh_is_not_printable() {
        let report = validate_mesh(&TriMesh::default());
        assert!(report.is_empty);
        assert!(!report.is_printable());
        assert_eq!(report.first_failure(), Some("mesh is empty"));
    }

    #[test]
    fn bounding_box_spans_vertices() {
        let (min, max) = bounding_box(&tetrahedron()).unwrap();
        assert_eq!(min[0], 0.0);
        assert_eq!(max[0], 1.0);
        assert!((max[2] - 0.816).abs() < 1e-6);
    }
}
