use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::matrix::ModuleColor;

/// Which output models a build request produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Everything below.
    All,
    /// Flush single-piece plate with raised features unioned on.
    Base,
    /// Plate alone, no raised features.
    Flat,
    /// Two-piece export: plate and feature set as separate, co-registered solids.
    Islands,
}

/// How the code matrix is realized in geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodeMode {
    /// Legacy placeholder frame around the pocket, no payload.
    Ring,
    /// One raised prism per feature module on the front face.
    Islands,
    /// Half-depth prism stacks on both faces, front stack mirrored so the
    /// code reads correctly from the reverse face.
    DualMirrored,
}

/// Raised material vs. cut recess for text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    Emboss,
    Engrave,
}

/// Which horizontal edge the front prompt anchors to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEdge {
    Top,
    Bottom,
}

/// Complete parameter set for one build invocation. All lengths in mm.
///
/// `#[serde(default)]` lets a parameter file specify any subset of fields;
/// the rest keep their defaults. Preset and explicit overrides are applied
/// on top by the caller, in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Code region width.
    pub code_w: f64,
    /// Code region height.
    pub code_h: f64,
    /// Plate border around the code region.
    pub border: f64,
    /// Plate thickness.
    pub thickness: f64,
    /// Minimum remaining wall thickness anywhere on the part.
    pub min_wall: f64,
    /// Corner rounding radius of the plate outline.
    pub corner_r: f64,
    /// Back recess diameter.
    pub recess_d: f64,
    /// Back recess depth.
    pub recess_depth: f64,
    /// Front pocket depth.
    pub pocket_depth: f64,
    /// Clearance added to mating features for a snug fit.
    pub fit_clearance: f64,
    /// Strap hole diameter. Ignored when a slot is configured.
    pub strap_hole_d: f64,
    /// Strap slot width. Non-zero together with `strap_slot_l` selects a slot.
    pub strap_slot_w: f64,
    /// Strap slot length.
    pub strap_slot_l: f64,
    /// Height of raised code/feature prisms above the front face.
    pub island_h: f64,
    /// Solid web left between the two stacks in dual-mirrored mode.
    pub web_thickness: f64,
    /// Print layer height, used for the color-switch layer index.
    pub layer_height: f64,

    /// Payload string handed to the code encoder.
    pub payload: String,
    /// Quiet-zone border, in modules.
    pub quiet_zone: u32,
    /// Geometry mode for the code matrix.
    pub code_mode: CodeMode,
    /// Which module color becomes geometry. `None` picks the per-mode
    /// default: dark for islands, light for dual-mirrored.
    pub feature_color: Option<ModuleColor>,

    /// Front prompt text. Empty disables the front text feature.
    pub front_text: String,
    pub front_style: TextStyle,
    /// Nominal front glyph height.
    pub front_text_h: f64,
    /// Raised height when the front text is embossed.
    pub front_feature_h: f64,
    /// Cut depth when the front text is engraved.
    pub front_depth: f64,
    pub front_edge: TextEdge,
    pub front_margin: f64,

    /// Back contact lines. Empty lines are skipped.
    pub back_name: String,
    pub back_phone: String,
    pub back_address: String,
    pub back_style: TextStyle,
    /// Nominal back glyph height.
    pub back_text_h: f64,
    /// Vertical gap between stacked back lines.
    pub back_line_gap: f64,
    pub back_margin: f64,

    /// Font file for glyph geometry and exact measurement. When absent the
    /// synthesizer falls back to heuristic measurement and degrades glyph
    /// output per the external-tool policy.
    pub font_path: Option<PathBuf>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            code_w: 50.0,
            code_h: 30.0,
            border: 3.0,
            thickness: 3.0,
            min_wall: 1.5,
            corner_r: 3.0,
            recess_d: 25.0,
            recess_depth: 1.0,
            pocket_depth: 0.2,
            fit_clearance: 0.25,
            strap_hole_d: 5.0,
            strap_slot_w: 0.0,
            strap_slot_l: 0.0,
            island_h: 0.5,
            web_thickness: 0.4,
            layer_height: 0.2,
            payload: String::new(),
            quiet_zone: 4,
            code_mode: CodeMode::Islands,
            feature_color: None,
            front_text: String::new(),
            front_style: TextStyle::Emboss,
            front_text_h: 4.5,
            front_feature_h: 0.5,
            front_depth: 0.4,
            front_edge: TextEdge::Bottom,
            front_margin: 3.0,
            back_name: String::new(),
            back_phone: String::new(),
            back_address: String::new(),
            back_style: TextStyle::Engrave,
            back_text_h: 4.0,
            back_line_gap: 1.2,
            back_margin: 3.0,
            font_path: None,
        }
    }
}

impl Params {
    /// Plate width: code region plus border on both sides.
    pub fn plate_w(&self) -> f64 {
        self.code_w + 2.0 * self.border
    }

    /// Plate height: code region plus border on both sides.
    pub fn plate_h(&self) -> f64 {
        self.code_h + 2.0 * self.border
    }

    /// Whether the strap anchor is a slot. Slot wins when both are non-zero.
    pub fn strap_is_slot(&self) -> bool {
        self.strap_slot_w > 0.0 && self.strap_slot_l > 0.0
    }

    /// Vertical extent of the strap cavity (slot length or hole diameter).
    pub fn strap_extent(&self) -> f64 {
        if self.strap_is_slot() {
            self.strap_slot_l
        } else {
            self.strap_hole_d
        }
    }

    /// Module color that becomes geometry for the configured mode.
    pub fn effective_feature_color(&self) -> ModuleColor {
        self.feature_color.unwrap_or(match self.code_mode {
            CodeMode::DualMirrored => ModuleColor::Light,
            _ => ModuleColor::Dark,
        })
    }

    /// Check every cross-field invariant. Runs before any geometry is built
    /// so violations are cheap; values are never clamped.
    pub fn validate(&self) -> Result<(), ParamError> {
        for (name, value) in [
            ("code_w", self.code_w),
            ("code_h", self.code_h),
            ("thickness", self.thickness),
            ("island_h", self.island_h),
            ("layer_height", self.layer_height),
        ] {
            if value <= 0.0 {
                return Err(ParamError::NonPositive {
                    name,
                    value,
                });
            }
        }
        if self.border < 1.0 {
            return Err(ParamError::BorderTooSmall {
                border: self.border,
            });
        }
        if self.thickness < 2.5 {
            return Err(ParamError::PlateTooThin {
                thickness: self.thickness,
            });
        }
        if self.min_wall < 1.5 {
            return Err(ParamError::WallTooThin {
                min_wall: self.min_wall,
            });
        }
        if self.pocket_depth + self.recess_depth > self.thickness - 0.6 {
            return Err(ParamError::PocketSumTooDeep {
                pocket_depth: self.pocket_depth,
                recess_depth: self.recess_depth,
                thickness: self.thickness,
            });
        }
        // Both faces share one engrave depth; either style selecting engrave
        // must leave min_wall of material behind the cut.
        let engrave_limit = self.thickness - self.min_wall;
        let engraving = self.front_style == TextStyle::Engrave
            || self.back_style == TextStyle::Engrave;
        if engraving && self.front_depth > engrave_limit {
            return Err(ParamError::EngraveTooDeep {
                depth: self.front_depth,
                limit: engrave_limit,
            });
        }
        if self.code_mode == CodeMode::DualMirrored
            && self.web_thickness >= self.thickness
        {
            return Err(ParamError::WebTooThick {
                web: self.web_thickness,
                thickness: self.thickness,
            });
        }
        Ok(())
    }
}

/// A parameter set violated one of its cross-field invariants. The message
/// names the violated constraint; nothing is clamped or repaired.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("border {border} violates border >= 1.0")]
    BorderTooSmall { border: f64 },

    #[error("thickness {thickness} violates thickness >= 2.5")]
    PlateTooThin { thickness: f64 },

    #[error("min_wall {min_wall} violates min_wall >= 1.5")]
    WallTooThin { min_wall: f64 },

    #[error(
        "pocket_depth {pocket_depth} + recess_depth {recess_depth} violates \
         pocket_depth + recess_depth <= thickness - 0.6 (thickness {thickness})"
    )]
    PocketSumTooDeep {
        pocket_depth: f64,
        recess_depth: f64,
        thickness: f64,
    },

    #[error("engrave depth {depth} violates thickness - depth >= min_wall (limit {limit})")]
    EngraveTooDeep { depth: f64, limit: f64 },

    #[error("web_thickness {web} must be smaller than thickness {thickness}")]
    WebTooThick { web: f64, thickness: f64 },
}

/// Configuration errors outside the parameter invariants themselves.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown preset '{name}', expected one of pla, petg, abs")]
    UnknownPreset { name: String },
}
