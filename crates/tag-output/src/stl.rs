//! STL serialization — binary and ASCII formats.

use tag_kernel::TriMesh;

use crate::errors::OutputError;

/// Export a mesh as a binary STL byte buffer.
///
/// Binary STL format:
/// - 80-byte header (arbitrary text)
/// - u32 triangle count (little-endian)
/// - For each triangle: 3×f32 normal + 3×(3×f32 vertex) + u16 attribute = 50 bytes
pub fn export_binary_stl(mesh: &TriMesh, name: &str) -> Result<Vec<u8>, OutputError> {
    let tri_count = validate(mesh)?;

    let file_size = 80 + 4 + tri_count * 50;
    let mut buf = Vec::with_capacity(file_size);

    let header = format!("binary STL: {}", name);
    let header_bytes = header.as_bytes();
    buf.extend_from_slice(&header_bytes[..header_bytes.len().min(80)]);
    buf.resize(80, 0u8);

    buf.extend_from_slice(&(tri_count as u32).to_le_bytes());

    for tri in mesh.indices.chunks(3) {
        let (n, v) = facet(mesh, tri);
        for c in n {
            buf.extend_from_slice(&c.to_le_bytes());
        }
        for vert in v {
            for c in vert {
                buf.extend_from_slice(&c.to_le_bytes());
            }
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }

    Ok(buf)
}

/// Export a mesh as an ASCII STL string.
pub fn export_ascii_stl(mesh: &TriMesh, name: &str) -> Result<String, OutputError> {
    let tri_count = validate(mesh)?;

    let mut out = String::with_capacity(tri_count * 300);
    out.push_str(&format!("solid {}\n", name));

    for tri in mesh.indices.chunks(3) {
        let (n, v) = facet(mesh, tri);
        out.push_str(&format!("  facet normal {} {} {}\n", n[0], n[1], n[2]));
        out.push_str("    outer loop\n");
        for vert in v {
            out.push_str(&format!(
                "      vertex {} {} {}\n",
                vert[0], vert[1], vert[2]
            ));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }

    out.push_str(&format!("endsolid {}\n", name));
    Ok(out)
}

fn validate(mesh: &TriMesh) -> Result<usize, OutputError> {
    let tri_count = mesh.indices.len() / 3;
    if tri_count == 0 {
        return Err(OutputError::Stl {
            reason: "mesh has no triangles".to_string(),
        });
    }
    let vertex_count = mesh.vertex_count();
    for &idx in &mesh.indices {
        if idx as usize >= vertex_count {
            return Err(OutputError::Stl {
                reason: format!("index {} out of range (vertex count = {})", idx, vertex_count),
            });
        }
    }
    Ok(tri_count)
}

/// Facet normal (from the cross product) and the three vertex positions.
fn facet(mesh: &TriMesh, tri: &[u32]) -> ([f32; 3], [[f32; 3]; 3]) {
    let v0 = mesh.vertex(tri[0]);
    let v1 = mesh.vertex(tri[1]);
    let v2 = mesh.vertex(tri[2]);

    let (ax, ay, az) = (v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]);
    let (bx, by, bz) = (v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]);
    let nx = ay * bz - az * by;
    let ny = az * bx - ax * bz;
    let nz = ax * by - ay * bx;
    let len = (nx * nx + ny * ny + nz * nz).sqrt();
    let n = if len > 1e-12 {
        [nx / len, ny / len, nz / len]
    } else {
        [0.0, 0.0, 1.0]
    };
    (n, [v0, v1, v2])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> TriMesh {
        TriMesh {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn binary_stl_has_exact_size() {
        let bytes = export_binary_stl(&triangle(), "test").unwrap();
        assert_eq!(bytes.len(), 80 + 4 + 50);
        assert_eq!(u32::from_le_bytes(bytes[80..84].try_into().unwrap()), 1);
    }

    #[test]
    fn binary_stl_is_byte_stable() {
        let a = export_binary_stl(&triangle(), "test").unwrap();
        let b = export_binary_stl(&triangle(), "test").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn ascii_stl_wraps_solid_block() {
        let text = export_ascii_stl(&triangle(), "plate").unwrap();
        assert!(text.starts_with("solid plate\n"));
        assert!(text.ends_with("endsolid plate\n"));
        assert_eq!(text.matches("facet normal").count(), 1);
        assert!(text.contains("facet normal 0 0 1"));
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let err = export_binary_stl(&TriMesh::default(), "x").unwrap_err();
        assert!(matches!(err, OutputError::Stl { .. }));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mesh = TriMesh {
            vertices: vec![0.0, 0.0, 0.0],
            indices: vec![0, 1, 2],
        };
        assert!(export_binary_stl(&mesh, "x").is_err());
    }
}
