use std::path::PathBuf;

use tag_layout::LayoutConfig;
use tag_types::{Params, Variant};

/// Everything one invocation needs, passed explicitly. No environment
/// toggles, no ambient state.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub params: Params,
    pub variant: Variant,
    pub out_dir: PathBuf,
    /// Strict mode promotes integrity failures and missing collaborators to
    /// hard errors. Permissive mode logs and continues; preview builds only.
    pub strict: bool,
    /// Deterministic mode drops wall-clock metadata so repeated builds are
    /// byte-identical end to end.
    pub deterministic: bool,
    /// Collaborator-produced layout; authoritative when present.
    pub layout_config: Option<LayoutConfig>,
}

impl BuildRequest {
    pub fn new(params: Params, variant: Variant, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            params,
            variant,
            out_dir: out_dir.into(),
            strict: true,
            deterministic: true,
            layout_config: None,
        }
    }
}
