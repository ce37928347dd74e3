//! Boolean composition of output variants from shared body/feature solids.
//!
//! Thin orchestration over the kernel's union/cut; produces solids and file
//! names, never writes files.

use tag_kernel::{Kernel, SolidHandle};
use tag_types::Variant;

use crate::types::BuildError;

pub const FILE_BASE: &str = "tag_base.stl";
pub const FILE_FLAT: &str = "tag_alt_flat_front.stl";
pub const FILE_ISLANDS_BASE: &str = "tag_alt_qr_islands_base.stl";
pub const FILE_ISLANDS_FEATURES: &str = "tag_alt_qr_islands_features.stl";

/// One output solid with its fixed file name.
#[derive(Debug, Clone)]
pub struct ComposedSolid {
    pub file_name: &'static str,
    pub solid: SolidHandle,
}

/// Realize one named variant from the shared body and feature solids.
///
/// `features_recessed` selects the dual-mirrored composition, where the
/// feature stacks are cut into the body and the second material fills the
/// recesses; otherwise features are raised islands on the front face.
pub fn compose_variant(
    kernel: &mut dyn Kernel,
    variant: Variant,
    body: &SolidHandle,
    features: &SolidHandle,
    features_recessed: bool,
) -> Result<Vec<ComposedSolid>, BuildError> {
    match variant {
        Variant::Flat => Ok(vec![ComposedSolid {
            file_name: FILE_FLAT,
            solid: body.clone(),
        }]),

        Variant::Base => {
            let solid = if features_recessed {
                let hollowed = kernel.subtract(body, features)?;
                kernel.union(&hollowed, features)?
            } else {
                kernel.union(body, features)?
            };
            Ok(vec![ComposedSolid {
                file_name: FILE_BASE,
                solid,
            }])
        }

        Variant::Islands => {
            let piece_body = if features_recessed {
                kernel.subtract(body, features)?
            } else {
                body.clone()
            };
            Ok(vec![
                ComposedSolid {
                    file_name: FILE_ISLANDS_BASE,
                    solid: piece_body,
                },
                ComposedSolid {
                    file_name: FILE_ISLANDS_FEATURES,
                    solid: features.clone(),
                },
            ])
        }

        Variant::All => {
            let mut out = compose_variant(kernel, Variant::Base, body, features, features_recessed)?;
            out.extend(compose_variant(
                kernel,
                Variant::Flat,
                body,
                features,
                features_recessed,
            )?);
            out.extend(compose_variant(
                kernel,
                Variant::Islands,
                body,
                features,
                features_recessed,
            )?);
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tag_kernel::{MockKernel, Profile};

    fn body_and_features(kernel: &mut MockKernel) -> (SolidHandle, SolidHandle) {
        let body = kernel
            .extrude(
                &Profile::Rect {
                    cx: 0.0,
                    cy: 0.0,
                    w: 56.0,
                    h: 36.0,
                },
                -1.5,
                3.0,
            )
            .unwrap();
        let features = kernel
            .extrude(
                &Profile::Rect {
                    cx: 0.0,
                    cy: 0.0,
                    w: 2.0,
                    h: 2.0,
                },
                1.5,
                0.5,
            )
            .unwrap();
        (body, features)
    }

    #[test]
    fn all_variant_produces_four_files() {
        let mut kernel = MockKernel::new();
        let (body, features) = body_and_features(&mut kernel);
        let out = compose_variant(&mut kernel, Variant::All, &body, &features, false).unwrap();
        let names: Vec<_> = out.iter().map(|c| c.file_name).collect();
        assert_eq!(
            names,
            vec![
                FILE_BASE,
                FILE_FLAT,
                FILE_ISLANDS_BASE,
                FILE_ISLANDS_FEATURES
            ]
        );
    }

    #[test]
    fn base_variant_unions_features_onto_the_body() {
        let mut kernel = MockKernel::new();
        let (body, features) = body_and_features(&mut kernel);
        let out = compose_variant(&mut kernel, Variant::Base, &body, &features, false).unwrap();
        assert_eq!(kernel.boxes(&out[0].solid).unwrap().len(), 2);
        let (_, max) = kernel.bounding_box(&out[0].solid).unwrap();
        assert!((max[2] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn islands_variant_pieces_register_flush() {
        let mut kernel = MockKernel::new();
        let (body, features) = body_and_features(&mut kernel);
        let out = compose_variant(&mut kernel, Variant::Islands, &body, &features, false).unwrap();
        let (_, body_max) = kernel.bounding_box(&out[0].solid).unwrap();
        let (feat_min, _) = kernel.bounding_box(&out[1].solid).unwrap();
        assert!((body_max[2] - feat_min[2]).abs() < 1e-12, "flush stack");
    }

    #[test]
    fn recessed_composition_cuts_before_filling() {
        let mut kernel = MockKernel::new();
        let (body, features) = body_and_features(&mut kernel);
        let out = compose_variant(&mut kernel, Variant::Base, &body, &features, true).unwrap();
        // Mock subtraction records the cut; the union then adds the fill.
        assert_eq!(kernel.cut_count(&out[0].solid), Some(1));
    }
}
