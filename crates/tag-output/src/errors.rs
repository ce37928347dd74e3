/// Errors while serializing or writing build outputs.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("STL serialization failed: {reason}")]
    Stl { reason: String },

    #[error("manifest serialization failed: {0}")]
    Manifest(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
