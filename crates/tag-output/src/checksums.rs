//! Checksum list: one `hash  filename` line per output, ordered by
//! filename so the file itself is deterministic.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::OutputError;
use crate::manifest::FileEntry;

pub const CHECKSUMS_NAME: &str = "SHA256SUMS";

pub fn write_checksums(
    dir: &Path,
    files: &BTreeMap<String, FileEntry>,
) -> Result<PathBuf, OutputError> {
    let mut out = String::new();
    for (name, entry) in files {
        out.push_str(&entry.sha256);
        out.push_str("  ");
        out.push_str(name);
        out.push('\n');
    }
    let path = dir.join(CHECKSUMS_NAME);
    std::fs::write(&path, out)?;
    Ok(path)
}
