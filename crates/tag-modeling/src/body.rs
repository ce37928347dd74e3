//! Base plate construction: outline, strap reinforcement and cavity,
//! front pocket, back recess, cosmetic edge treatment.

use tag_kernel::{Kernel, KernelError, Profile, SolidHandle};
use tag_types::Params;

use crate::types::BuildError;

/// Cut tools extend past the faces they cut so booleans never see exactly
/// coplanar faces.
pub const CUT_EPS: f64 = 0.01;

/// Radius of the cosmetic top-edge fillet.
const TOP_FILLET_R: f64 = 0.5;

/// A built plate body plus non-fatal diagnostics.
#[derive(Debug, Clone)]
pub struct BodyBuild {
    pub solid: SolidHandle,
    pub warnings: Vec<String>,
}

/// Build the plate body.
///
/// Constraint violations are rejected upstream; any kernel failure in here
/// is a fatal geometry error and is not retried.
pub fn build_body(kernel: &mut dyn Kernel, p: &Params) -> Result<BodyBuild, BuildError> {
    let w = p.plate_w();
    let h = p.plate_h();
    let t = p.thickness;
    let mut warnings = Vec::new();

    let plate = kernel.extrude(
        &Profile::RoundedRect {
            cx: 0.0,
            cy: 0.0,
            w,
            h,
            r: p.corner_r,
        },
        -t / 2.0,
        t,
    )?;

    // Strap reinforcement pad, grown by one wall thickness all around, then
    // the cavity cut fully through at the pad center. The anchor clears the
    // top edge by one wall thickness.
    let strap_cy = h / 2.0 - p.min_wall - p.strap_extent() / 2.0;
    let (pad, cavity): (Profile, Profile) = if p.strap_is_slot() {
        (
            Profile::Slot {
                cx: 0.0,
                cy: strap_cy,
                w: p.strap_slot_w + 2.0 * p.min_wall,
                l: p.strap_slot_l + 2.0 * p.min_wall,
            },
            Profile::Slot {
                cx: 0.0,
                cy: strap_cy,
                w: p.strap_slot_w,
                l: p.strap_slot_l,
            },
        )
    } else {
        (
            Profile::Circle {
                cx: 0.0,
                cy: strap_cy,
                d: p.strap_hole_d + 2.0 * p.min_wall,
            },
            Profile::Circle {
                cx: 0.0,
                cy: strap_cy,
                d: p.strap_hole_d,
            },
        )
    };

    let pad_solid = kernel.extrude(&pad, -t / 2.0, t)?;
    let mut body = kernel.union(&plate, &pad_solid)?;

    let cavity_solid = kernel.extrude(&cavity, -t / 2.0 - CUT_EPS, t + 2.0 * CUT_EPS)?;
    body = kernel.subtract(&body, &cavity_solid)?;

    // Cosmetic only; a kernel without fillets may decline.
    match kernel.fillet_top_edges(&body, TOP_FILLET_R) {
        Ok(filleted) => body = filleted,
        Err(KernelError::NotSupported { operation }) => {
            warnings.push(format!("kernel declined {operation}, top edges left sharp"));
        }
        Err(e) => return Err(e.into()),
    }

    // Front pocket, one fit clearance per side around the code region.
    let pocket = kernel.extrude(
        &Profile::Rect {
            cx: 0.0,
            cy: 0.0,
            w: p.code_w + 2.0 * p.fit_clearance,
            h: p.code_h + 2.0 * p.fit_clearance,
        },
        t / 2.0 - p.pocket_depth,
        p.pocket_depth + CUT_EPS,
    )?;
    body = kernel.subtract(&body, &pocket)?;

    // Back recess.
    let recess = kernel.extrude(
        &Profile::Circle {
            cx: 0.0,
            cy: 0.0,
            d: p.recess_d + p.fit_clearance,
        },
        -t / 2.0 - CUT_EPS,
        p.recess_depth + CUT_EPS,
    )?;
    body = kernel.subtract(&body, &recess)?;

    Ok(BodyBuild {
        solid: body,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tag_kernel::MockKernel;

    #[test]
    fn body_spans_plate_dimensions() {
        let p = Params::default();
        let mut kernel = MockKernel::new();
        let build = build_body(&mut kernel, &p).unwrap();

        let (min, max) = kernel.bounding_box(&build.solid).unwrap();
        assert!((max[0] - min[0] - 56.0).abs() < 1e-9);
        assert!((max[1] - min[1] - 36.0).abs() < 1e-9);
        assert!((max[2] - min[2] - 3.0).abs() < 1e-9);
        assert!((min[2] + 1.5).abs() < 1e-9);
    }

    #[test]
    fn body_applies_three_cuts() {
        let p = Params::default();
        let mut kernel = MockKernel::new();
        let build = build_body(&mut kernel, &p).unwrap();
        // Strap cavity, front pocket, back recess.
        assert_eq!(kernel.cut_count(&build.solid), Some(3));
    }

    #[test]
    fn slot_pad_grows_by_wall_thickness() {
        let p = Params {
            strap_slot_w: 4.0,
            strap_slot_l: 12.0,
            ..Params::default()
        };
        let mut kernel = MockKernel::new();
        let build = build_body(&mut kernel, &p).unwrap();
        // The pad widens the top band beyond the plate only if the slot is
        // long enough; here it stays inside, so the bbox is the plate's.
        let (min, max) = kernel.bounding_box(&build.solid).unwrap();
        assert!((max[0] - min[0] - 56.0).abs() < 1e-9);
        assert!((max[1] - min[1] - 36.0).abs() < 1e-9);
    }

    #[test]
    fn mock_kernel_fillet_is_cosmetic_no_warning() {
        let p = Params::default();
        let mut kernel = MockKernel::new();
        let build = build_body(&mut kernel, &p).unwrap();
        assert!(build.warnings.is_empty());
    }
}
