//! Edge adjacency over position-quantized vertices.

use std::collections::HashMap;

use tag_kernel::TriMesh;

/// Vertex positions quantized to 1e-4 mm so duplicated per-face vertices
/// collapse onto one logical vertex.
pub(crate) fn quantize(v: f32) -> i64 {
    (f64::from(v) * 10_000.0).round() as i64
}

pub(crate) type VertKey = (i64, i64, i64);

pub(crate) fn vert_key(mesh: &TriMesh, index: u32) -> VertKey {
    let v = mesh.vertex(index);
    (quantize(v[0]), quantize(v[1]), quantize(v[2]))
}

/// Adjacency information for a triangle mesh.
///
/// Maps undirected edges (by canonical vertex id) to the triangles using
/// them, giving boundary and non-manifold counts.
#[derive(Debug, Clone)]
pub struct MeshAdjacency {
    edge_to_faces: HashMap<(u32, u32), Vec<usize>>,
    /// Canonical vertex id per original vertex index.
    canonical: Vec<u32>,
    canonical_count: usize,
}

impl MeshAdjacency {
    /// Build adjacency from a mesh, welding vertices by quantized position.
    pub fn build(mesh: &TriMesh) -> Self {
        let mut ids: HashMap<VertKey, u32> = HashMap::new();
        let mut canonical = Vec::with_capacity(mesh.vertex_count());
        for i in 0..mesh.vertex_count() as u32 {
            let key = vert_key(mesh, i);
            let next = ids.len() as u32;
            let id = *ids.entry(key).or_insert(next);
            canonical.push(id);
        }

        let mut edge_to_faces: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        for (face_idx, tri) in mesh.indices.chunks(3).enumerate() {
            let c = [
                canonical[tri[0] as usize],
                canonical[tri[1] as usize],
                canonical[tri[2] as usize],
            ];
            for (a, b) in [(c[0], c[1]), (c[1], c[2]), (c[2], c[0])] {
                edge_to_faces
                    .entry(normalize_edge(a, b))
                    .or_default()
                    .push(face_idx);
            }
        }

        Self {
            edge_to_faces,
            canonical,
            canonical_count: ids.len(),
        }
    }

    /// Canonical vertex ids of one triangle.
    pub(crate) fn face_canonical(&self, mesh: &TriMesh, face_idx: usize) -> [u32; 3] {
        let tri = &mesh.indices[face_idx * 3..face_idx * 3 + 3];
        [
            self.canonical[tri[0] as usize],
            self.canonical[tri[1] as usize],
            self.canonical[tri[2] as usize],
        ]
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.canonical_count
    }

    pub fn boundary_edge_count(&self) -> usize {
        self.edge_to_faces
            .values()
            .filter(|faces| faces.len() == 1)
            .count()
    }

    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_to_faces
            .values()
            .filter(|faces| faces.len() > 2)
            .count()
    }

    /// Every edge has at most 2 adjacent triangles.
    pub fn is_manifold(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() <= 2)
    }

    /// No boundary edges: the surface is closed.
    pub fn is_watertight(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() >= 2)
    }
}

#[inline]
fn normalize_edge(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
