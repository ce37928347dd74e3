//! Collaborator-produced layout configuration.
//!
//! The browser layout tool exports `layout_config.json` with the exact
//! geometry it showed the user. When present it is authoritative: the solver
//! echoes its computed centers and sizes instead of re-deriving them.

use serde::{Deserialize, Serialize};

use crate::region::Region;
use crate::solver::{Layout, LayoutError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub input: LayoutInput,
    pub computed: LayoutComputed,
    pub stacking: Stacking,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInput {
    pub tag_w: f64,
    pub tag_h: f64,
    /// Modules per side, quiet zone excluded.
    pub modules: u32,
    pub module_size: f64,
    #[serde(default)]
    pub quiet: u32,
    pub slit_width: f64,
    pub slit_height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutComputed {
    pub qr_size: f64,
    pub left_col_mm: f64,
    pub right_col_mm: f64,
    /// Slit center in canvas coordinates (top-left origin, Y down).
    pub slit_center: CanvasPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stacking {
    pub top_side: SideSpec,
    pub bottom_side: SideSpec,
    pub web_thickness: f64,
    pub half_depth: f64,
    #[serde(default)]
    pub total_thickness: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideSpec {
    #[serde(default)]
    pub description: String,
    /// Whether this side's feature stack is mirrored across the vertical
    /// symmetry plane.
    #[serde(default)]
    pub mirrored: bool,
}

impl LayoutConfig {
    pub fn from_json_str(json: &str) -> Result<Self, LayoutError> {
        serde_json::from_str(json).map_err(|e| LayoutError::BadConfig {
            reason: e.to_string(),
        })
    }
}

/// Build a layout directly from the config's computed values.
///
/// The code block centers in the left column, the slit lands at its exported
/// center converted to center-origin Y-up coordinates. No re-derivation.
pub fn layout_from_config(cfg: &LayoutConfig) -> Result<Layout, LayoutError> {
    let w = cfg.input.tag_w;
    let h = cfg.input.tag_h;
    if w <= 0.0 || h <= 0.0 {
        return Err(LayoutError::BadConfig {
            reason: format!("tag dimensions must be positive, got {w} x {h}"),
        });
    }

    let code = Region::new(
        "code_block",
        -w / 2.0 + cfg.computed.left_col_mm / 2.0,
        0.0,
        cfg.computed.qr_size,
        cfg.computed.qr_size,
        0.0,
    );
    let strap = Region::new(
        "strap_slit",
        cfg.computed.slit_center.x - w / 2.0,
        h / 2.0 - cfg.computed.slit_center.y,
        cfg.input.slit_width,
        cfg.input.slit_height,
        0.0,
    );

    Ok(Layout {
        plate_w: w,
        plate_h: h,
        code,
        strap,
        front_lines: Vec::new(),
        back_lines: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "input": {
            "tagW": 240.0, "tagH": 94.0,
            "modules": 37, "moduleSize": 2.0, "quiet": 0,
            "slitWidth": 4.5, "slitHeight": 20.0
        },
        "computed": {
            "qrSize": 74.0,
            "leftColMm": 86.0, "rightColMm": 150.0,
            "slitCenter": { "x": 228.0, "y": 47.0 }
        },
        "stacking": {
            "topSide": { "description": "back of tag, reads normally" },
            "bottomSide": { "description": "front of tag", "mirrored": true },
            "webThickness": 0.4,
            "halfDepth": 1.3
        }
    }"#;

    #[test]
    fn parses_collaborator_config() {
        let cfg = LayoutConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(cfg.input.modules, 37);
        assert_eq!(cfg.input.module_size, 2.0);
        assert_eq!(cfg.stacking.web_thickness, 0.4);
        assert!(cfg.stacking.bottom_side.mirrored);
    }

    #[test]
    fn config_layout_converts_to_centered_coordinates() {
        let cfg = LayoutConfig::from_json_str(SAMPLE).unwrap();
        let layout = layout_from_config(&cfg).unwrap();
        assert_eq!(layout.plate_w, 240.0);
        // Slit center x: 228 - 120 = 108; y: 47 - 47 = 0.
        assert!((layout.strap.cx - 108.0).abs() < 1e-9);
        assert!(layout.strap.cy.abs() < 1e-9);
        // Code block centered in the left column.
        assert!((layout.code.cx - (-120.0 + 43.0)).abs() < 1e-9);
    }

    #[test]
    fn malformed_config_is_rejected() {
        let err = LayoutConfig::from_json_str("{}").unwrap_err();
        assert!(matches!(err, LayoutError::BadConfig { .. }));
    }
}
