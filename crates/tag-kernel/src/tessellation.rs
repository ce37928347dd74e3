//! Tessellation wrapper over truck-meshalgo.

use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::{MeshableShape, MeshedShape};

use crate::types::{KernelError, TriMesh};

type TruckSolid = truck_modeling::Solid;

/// Tessellate a truck Solid into a flat triangle mesh.
///
/// Faces are merged into a single polygon mesh; vertices are not welded
/// across faces, so consumers match them by position where needed.
pub fn tessellate_solid(solid: &TruckSolid, tolerance: f64) -> Result<TriMesh, KernelError> {
    let meshed = solid.triangulation(tolerance);
    let mesh = meshed.to_polygon();

    let positions = mesh.positions();
    let tri_faces = mesh.tri_faces();

    let mut vertices = Vec::with_capacity(positions.len() * 3);
    for pos in positions {
        vertices.push(pos[0] as f32);
        vertices.push(pos[1] as f32);
        vertices.push(pos[2] as f32);
    }

    let mut indices = Vec::with_capacity(tri_faces.len() * 3);
    for tri in tri_faces {
        for v in tri.iter() {
            indices.push(v.pos as u32);
        }
    }

    if indices.is_empty() {
        return Err(KernelError::TessellationFailed {
            reason: "triangulation produced no triangles".to_string(),
        });
    }

    Ok(TriMesh { vertices, indices })
}
