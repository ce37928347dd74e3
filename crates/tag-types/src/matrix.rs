use serde::{Deserialize, Serialize};

/// One cell of the code matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleColor {
    Dark,
    Light,
}

/// A square dark/light module grid with an explicit quiet-zone border,
/// produced by the payload encoder. Immutable once built.
///
/// `side` counts modules per side including the quiet zone. The payload is
/// recorded only as a digest; the raw text never travels with the matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeMatrix {
    side: usize,
    quiet_zone: u32,
    modules: Vec<bool>,
    payload_digest: String,
}

impl CodeMatrix {
    /// Build a matrix from row-major dark flags. `modules.len()` must be
    /// `side * side`; callers are the encoder and the diagram importer.
    pub fn new(side: usize, quiet_zone: u32, modules: Vec<bool>, payload_digest: String) -> Self {
        assert_eq!(modules.len(), side * side, "matrix must be square");
        Self {
            side,
            quiet_zone,
            modules,
            payload_digest,
        }
    }

    /// Modules per side, quiet zone included.
    pub fn side(&self) -> usize {
        self.side
    }

    pub fn quiet_zone(&self) -> u32 {
        self.quiet_zone
    }

    /// Hex digest of the encoded payload, for traceability metadata.
    pub fn payload_digest(&self) -> &str {
        &self.payload_digest
    }

    /// Whether the module at (row, col) is dark. Row 0 is the top row.
    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        self.modules[row * self.side + col]
    }

    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }

    /// Number of modules matching the requested feature color.
    pub fn count(&self, color: ModuleColor) -> usize {
        match color {
            ModuleColor::Dark => self.dark_count(),
            ModuleColor::Light => self.side * self.side - self.dark_count(),
        }
    }

    /// Iterate (row, col) positions of modules in the given color.
    pub fn positions(&self, color: ModuleColor) -> impl Iterator<Item = (usize, usize)> + '_ {
        let want_dark = color == ModuleColor::Dark;
        (0..self.side).flat_map(move |row| {
            (0..self.side).filter_map(move |col| {
                if self.is_dark(row, col) == want_dark {
                    Some((row, col))
                } else {
                    None
                }
            })
        })
    }
}
