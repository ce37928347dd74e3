//! Canonical triangle ordering.
//!
//! Kernel tessellation emits triangles in whatever order its internal
//! traversal produces. Canonicalization makes the serialized mesh a pure
//! function of the geometry: vertices are quantized to 0.1 µm, each
//! triangle is rotated so its smallest vertex leads (winding preserved),
//! and triangles are sorted by a rotation-invariant key.

use std::collections::HashMap;

use tag_kernel::TriMesh;

/// Quantization step in mm.
const QUANTUM: f64 = 1e-4;

type QVert = (i64, i64, i64);

fn quantize(v: f32) -> i64 {
    (f64::from(v) / QUANTUM).round() as i64
}

fn dequantize(q: i64) -> f32 {
    (q as f64 * QUANTUM) as f32
}

/// Produce the canonical form of a mesh. Identical geometry yields
/// byte-identical output regardless of input triangle or vertex order.
pub fn canonicalize(mesh: &TriMesh) -> TriMesh {
    let mut triangles: Vec<[QVert; 3]> = mesh
        .indices
        .chunks(3)
        .map(|tri| {
            let q = [
                qvert(mesh, tri[0]),
                qvert(mesh, tri[1]),
                qvert(mesh, tri[2]),
            ];
            rotate_min_first(q)
        })
        .collect();

    triangles.sort_by_key(|t| {
        let mut sorted = *t;
        sorted.sort_unstable();
        (sorted, *t)
    });

    let mut vert_ids: HashMap<QVert, u32> = HashMap::new();
    let mut vertices: Vec<f32> = Vec::new();
    let mut indices: Vec<u32> = Vec::with_capacity(triangles.len() * 3);

    for tri in &triangles {
        for q in tri {
            let next = vert_ids.len() as u32;
            let id = *vert_ids.entry(*q).or_insert_with(|| {
                vertices.push(dequantize(q.0));
                vertices.push(dequantize(q.1));
                vertices.push(dequantize(q.2));
                next
            });
            indices.push(id);
        }
    }

    TriMesh { vertices, indices }
}

fn qvert(mesh: &TriMesh, index: u32) -> QVert {
    let v = mesh.vertex(index);
    (quantize(v[0]), quantize(v[1]), quantize(v[2]))
}

/// Rotate the vertex triple so the smallest vertex comes first, keeping the
/// cyclic order (and with it the winding).
fn rotate_min_first(tri: [QVert; 3]) -> [QVert; 3] {
    let min_idx = if tri[0] <= tri[1] && tri[0] <= tri[2] {
        0
    } else if tri[1] <= tri[2] {
        1
    } else {
        2
    };
    [
        tri[min_idx],
        tri[(min_idx + 1) % 3],
        tri[(min_idx + 2) % 3],
    ]
}
