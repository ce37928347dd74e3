use crate::params::{ConfigError, Params};

/// Apply a named material preset on top of the current parameter values.
///
/// Presets tune only fit and layer height; callers apply explicit overrides
/// afterwards so precedence stays explicit > preset > file > default.
pub fn apply_preset(params: &mut Params, name: &str) -> Result<(), ConfigError> {
    match name {
        "pla" => {
            params.fit_clearance = 0.25;
            params.layer_height = 0.2;
        }
        "petg" => {
            params.fit_clearance = 0.3;
            params.layer_height = 0.2;
        }
        "abs" => {
            // ABS shrinks more; leave extra clearance and a coarser layer.
            params.fit_clearance = 0.35;
            params.layer_height = 0.25;
        }
        other => {
            return Err(ConfigError::UnknownPreset {
                name: other.to_string(),
            })
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_presets_apply() {
        for name in ["pla", "petg", "abs"] {
            let mut p = Params::default();
            apply_preset(&mut p, name).unwrap();
            assert!(p.validate().is_ok());
        }
    }

    #[test]
    fn abs_loosens_fit() {
        let mut p = Params::default();
        apply_preset(&mut p, "abs").unwrap();
        assert!(p.fit_clearance > Params::default().fit_clearance);
    }

    #[test]
    fn unknown_preset_named_in_error() {
        let mut p = Params::default();
        let err = apply_preset(&mut p, "nylon").unwrap_err();
        assert!(err.to_string().contains("nylon"));
    }

    #[test]
    fn explicit_override_wins_over_preset() {
        let mut p = Params::default();
        apply_preset(&mut p, "petg").unwrap();
        p.fit_clearance = 0.4;
        assert_eq!(p.fit_clearance, 0.4);
    }
}
