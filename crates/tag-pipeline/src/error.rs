use tag_kernel::KernelError;
use tag_layout::LayoutError;
use tag_modeling::{BuildError, EncodeError};
use tag_output::OutputError;
use tag_types::{ConfigError, ParamError};

/// The pipeline's error taxonomy. Exit codes follow the failure class, and
/// every message names the violated constraint or colliding pair.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("geometry integrity failure in {file}: {reason}")]
    GeometryIntegrity { file: String, reason: String },

    #[error("external tool unavailable: {what}")]
    ExternalToolUnavailable { what: String },

    #[error("diagram import failed: {reason}")]
    Diagram { reason: String },

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

// Encoder and kernel errors surface through the same channel as the rest of
// solid synthesis; route them into the Build class so exit codes match the
// explicit `.map_err(BuildError::from)` conversions used elsewhere.
impl From<EncodeError> for PipelineError {
    fn from(e: EncodeError) -> Self {
        PipelineError::Build(BuildError::from(e))
    }
}

impl From<KernelError> for PipelineError {
    fn from(e: KernelError) -> Self {
        PipelineError::Build(BuildError::from(e))
    }
}

impl PipelineError {
    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Param(_)
            | PipelineError::Layout(_)
            | PipelineError::Config(_)
            | PipelineError::Diagram { .. } => 2,
            PipelineError::GeometryIntegrity { .. } | PipelineError::Build(_) => 3,
            PipelineError::ExternalToolUnavailable { .. } => 4,
            PipelineError::Output(_) => 1,
        }
    }
}
