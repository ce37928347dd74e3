//! Deterministic serialization of build outputs: canonical triangle order,
//! STL bytes, content hashes, the manifest, and the checksum list.

pub mod canonical;
pub mod checksums;
pub mod errors;
pub mod hashing;
pub mod manifest;
pub mod stl;

pub use canonical::canonicalize;
pub use checksums::write_checksums;
pub use errors::OutputError;
pub use hashing::sha256_hex;
pub use manifest::{
    color_switch_layer_index, write_manifest, CodeSummary, FileEntry, Manifest, MANIFEST_NAME,
};
pub use stl::{export_ascii_stl, export_binary_stl};
