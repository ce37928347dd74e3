//! The build manifest: output name → content hash, echoed parameters, and
//! derived metadata. Written once per invocation, never mutated.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tag_types::{Params, Variant};

use crate::errors::OutputError;

pub const MANIFEST_NAME: &str = "manifest.json";

/// Current manifest format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub sha256: String,
}

/// Derived code metadata echoed into the manifest. Carries the payload only
/// as a digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSummary {
    pub module_size: f64,
    pub quiet_zone: u32,
    pub feature_count: usize,
    pub payload_sha256: String,
    /// Print layer at which the second material starts.
    pub color_switch_layer: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub format: String,
    pub version: u32,
    /// Wall-clock timestamp; omitted in deterministic builds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    pub variant: Variant,
    /// Echo of the validated parameter set this build used.
    pub params: Params,
    /// Output file name → content hash. BTreeMap keeps serialization order
    /// stable.
    pub files: BTreeMap<String, FileEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

impl Manifest {
    pub fn new(variant: Variant, params: Params, deterministic: bool) -> Self {
        Self {
            format: "tag-models".to_string(),
            version: FORMAT_VERSION,
            created: if deterministic {
                None
            } else {
                Some(Utc::now())
            },
            variant,
            params,
            files: BTreeMap::new(),
            code: None,
            warnings: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, OutputError> {
        serde_json::to_string_pretty(self).map_err(|e| OutputError::Manifest(e.to_string()))
    }
}

/// Color-switch layer: the print layer index at which the feature material
/// takes over, never below the first layer.
pub fn color_switch_layer_index(island_h: f64, layer_height: f64) -> u32 {
    ((island_h / layer_height).round() as u32).max(1)
}

/// Write the manifest into `dir` and return its path.
pub fn write_manifest(dir: &Path, manifest: &Manifest) -> Result<PathBuf, OutputError> {
    let path = dir.join(MANIFEST_NAME);
    let mut json = manifest.to_json()?;
    json.push('\n');
    std::fs::write(&path, json)?;
    Ok(path)
}
