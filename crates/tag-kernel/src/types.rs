use serde::{Deserialize, Serialize};

/// Opaque handle to a solid in the geometry kernel.
/// Valid only for the kernel instance that produced it; never persisted.
#[derive(Debug, Clone)]
pub struct SolidHandle(pub(crate) u64);

impl SolidHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("profile construction failed: {reason}")]
    ProfileFailed { reason: String },

    #[error("tessellation failed: {reason}")]
    TessellationFailed { reason: String },

    #[error("solid not found: {id}")]
    SolidNotFound { id: u64 },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },

    #[error("kernel error: {message}")]
    Other { message: String },
}

/// Triangulated surface of a solid: flat vertex array plus triangle indices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriMesh {
    /// Flat array of vertex positions [x0, y0, z0, x1, y1, z1, ...].
    pub vertices: Vec<f32>,
    /// Triangle indices into the vertex array, three per triangle.
    pub indices: Vec<u32>,
}

impl TriMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position of the vertex at `index`.
    pub fn vertex(&self, index: u32) -> [f32; 3] {
        let i = index as usize * 3;
        [self.vertices[i], self.vertices[i + 1], self.vertices[i + 2]]
    }

    /// Append another mesh, re-basing its indices.
    pub fn append(&mut self, other: &TriMesh) {
        let base = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }
}
