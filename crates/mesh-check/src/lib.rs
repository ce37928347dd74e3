//! Triangulated-mesh integrity checks.
//!
//! Answers one question for an exported mesh: is it printable? Watertight,
//! manifold, consistently wound, free of NaN coordinates, degenerate
//! triangles, and self-intersections. Vertices are matched by quantized
//! position, so meshes with per-face vertex duplication (the usual B-rep
//! tessellation output) are handled correctly.

pub mod adjacency;
pub mod intersect;
pub mod report;

pub use adjacency::MeshAdjacency;
pub use report::{bounding_box, validate_mesh, validate_mesh_with_options, MeshReport, ValidationOptions};
