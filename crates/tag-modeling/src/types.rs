use serde::Serialize;
use tag_kernel::KernelError;

/// Derived metadata from code-feature synthesis, echoed into the manifest.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureMeta {
    /// Edge length of one module, mm.
    pub module_size: f64,
    /// Quiet-zone border, in modules.
    pub quiet_zone: u32,
    /// Number of modules realized as geometry.
    pub feature_count: usize,
    /// SHA-256 of the encoded payload. The payload text itself is never
    /// echoed.
    pub payload_digest: String,
}

/// Errors from the payload encoder.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EncodeError {
    #[error("payload could not be encoded: {reason}")]
    EncodingFailed { reason: String },
}

/// Errors from the text synthesizer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TextError {
    #[error("font file unavailable: {path}")]
    FontUnavailable { path: String },

    #[error("font data could not be parsed: {path}")]
    FontUnreadable { path: String },

    #[error("no outline for glyph '{ch}'")]
    GlyphOutline { ch: char },

    #[error("engrave depth {depth} violates thickness - depth >= min_wall (limit {limit})")]
    EngraveTooDeep { depth: f64, limit: f64 },
}

/// Errors from solid synthesis.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildError {
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Text(#[from] TextError),

    #[error("feature synthesis produced no solids")]
    Empty,
}
