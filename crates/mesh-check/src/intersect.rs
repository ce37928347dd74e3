//! Self-intersection scan: AABB sweep broad phase, segment/triangle
//! narrow phase on pairs that share no vertex position.

use tag_kernel::TriMesh;

use crate::adjacency::MeshAdjacency;

#[derive(Debug, Clone)]
struct FaceData {
    canonical: [u32; 3],
    verts: [[f64; 3]; 3],
    aabb_min: [f64; 3],
    aabb_max: [f64; 3],
}

/// Count pairs of triangles whose interiors properly cross each other.
///
/// Pairs that share a vertex position are skipped, and boundary contact is
/// tolerated, so flush face-to-face assemblies do not report intersections.
/// Coplanar overlap is not detected.
pub(crate) fn self_intersection_count(mesh: &TriMesh, adj: &MeshAdjacency) -> usize {
    let face_count = mesh.triangle_count();
    let mut faces = Vec::with_capacity(face_count);
    for f in 0..face_count {
        let tri = &mesh.indices[f * 3..f * 3 + 3];
        let verts = [
            to_f64(mesh.vertex(tri[0])),
            to_f64(mesh.vertex(tri[1])),
            to_f64(mesh.vertex(tri[2])),
        ];
        let mut aabb_min = [f64::MAX; 3];
        let mut aabb_max = [f64::MIN; 3];
        for v in &verts {
            for i in 0..3 {
                aabb_min[i] = aabb_min[i].min(v[i]);
                aabb_max[i] = aabb_max[i].max(v[i]);
            }
        }
        faces.push(FaceData {
            canonical: adj.face_canonical(mesh, f),
            verts,
            aabb_min,
            aabb_max,
        });
    }

    // Sweep along x: compare each face only against faces whose x-interval
    // starts before this one ends.
    let mut order: Vec<usize> = (0..face_count).collect();
    order.sort_by(|&a, &b| {
        faces[a].aabb_min[0]
            .partial_cmp(&faces[b].aabb_min[0])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut count = 0;
    for i in 0..order.len() {
        let fa = &faces[order[i]];
        for &jb in order.iter().skip(i + 1) {
            let fb = &faces[jb];
            if fb.aabb_min[0] > fa.aabb_max[0] {
                break;
            }
            if fb.aabb_min[1] > fa.aabb_max[1]
                || fa.aabb_min[1] > fb.aabb_max[1]
                || fb.aabb_min[2] > fa.aabb_max[2]
                || fa.aabb_min[2] > fb.aabb_max[2]
            {
                continue;
            }
            if shares_vertex(&fa.canonical, &fb.canonical) {
                continue;
            }
            if triangles_cross(&fa.verts, &fb.verts) {
                count += 1;
            }
        }
    }
    count
}

fn shares_vertex(a: &[u32; 3], b: &[u32; 3]) -> bool {
    a.iter().any(|v| b.contains(v))
}

fn triangles_cross(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> bool {
    for i in 0..3 {
        let j = (i + 1) % 3;
        if segment_pierces_triangle(a[i], a[j], b) || segment_pierces_triangle(b[i], b[j], a) {
            return true;
        }
    }
    false
}

/// Möller–Trumbore restricted to proper crossings: the segment must pass
/// strictly through the triangle's interior, strictly between its endpoints.
fn segment_pierces_triangle(p0: [f64; 3], p1: [f64; 3], tri: &[[f64; 3]; 3]) -> bool {
    const EPS: f64 = 1e-7;

    let dir = sub(p1, p0);
    let e1 = sub(tri[1], tri[0]);
    let e2 = sub(tri[2], tri[0]);
    let h = cross(dir, e2);
    let det = dot(e1, h);
    if det.abs() < 1e-12 {
        return false;
    }
    let inv = 1.0 / det;
    let s = sub(p0, tri[0]);
    let u = inv * dot(s, h);
    if u <= EPS || u >= 1.0 - EPS {
        return false;
    }
    let q = cross(s, e1);
    let v = inv * dot(dir, q);
    if v <= EPS || u + v >= 1.0 - EPS {
        return false;
    }
    let t = inv * dot(e2, q);
    t > EPS && t < 1.0 - EPS
}

fn to_f64(v: [f32; 3]) -> [f64; 3] {
    [f64::from(v[0]), f64::from(v[1]), f64::from(v[2])]
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
