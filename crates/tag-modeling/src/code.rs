//! Code-matrix feature synthesis.
//!
//! Three geometry modes: the legacy placeholder ring, single-sided raised
//! islands, and the dual-sided mirrored stacks that keep the code readable
//! from both faces.

use tag_kernel::{Kernel, Profile, SolidHandle};
use tag_types::{CodeMatrix, Params};

use crate::body::CUT_EPS;
use crate::types::{BuildError, FeatureMeta};

/// Legacy placeholder: a raised frame between the plate outline and the
/// pocket, with the strap cavity cut through. Carries no payload.
pub fn ring_features(kernel: &mut dyn Kernel, p: &Params) -> Result<SolidHandle, BuildError> {
    let outer_w = p.plate_w();
    let outer_h = p.plate_h();
    let pocket_w = p.code_w + 2.0 * p.fit_clearance;
    let pocket_h = p.code_h + 2.0 * p.fit_clearance;

    let frame = Profile::Polygon {
        outer: rect_ring(0.0, 0.0, outer_w, outer_h),
        holes: vec![rect_ring(0.0, 0.0, pocket_w, pocket_h)],
    };
    let ring = kernel.extrude(&frame, p.thickness / 2.0, p.island_h)?;

    let strap_cy = outer_h / 2.0 - p.min_wall - p.strap_extent() / 2.0;
    let cavity: Profile = if p.strap_is_slot() {
        Profile::Slot {
            cx: 0.0,
            cy: strap_cy,
            w: p.strap_slot_w,
            l: p.strap_slot_l,
        }
    } else {
        Profile::Circle {
            cx: 0.0,
            cy: strap_cy,
            d: p.strap_hole_d,
        }
    };
    let cavity_solid = kernel.extrude(
        &cavity,
        p.thickness / 2.0 - CUT_EPS,
        p.island_h + 2.0 * CUT_EPS,
    )?;
    Ok(kernel.subtract(&ring, &cavity_solid)?)
}

/// One raised prism per feature module on the front face.
///
/// Module size is uniform in both axes: the smaller available axis decides,
/// the longer axis wastes its slack rather than distorting modules. Row 0
/// is the top row, so Y is inverted.
pub fn island_features(
    kernel: &mut dyn Kernel,
    p: &Params,
    matrix: &CodeMatrix,
    center: (f64, f64),
    avail: (f64, f64),
) -> Result<(SolidHandle, FeatureMeta), BuildError> {
    let module = module_size(matrix, avail);
    let color = p.effective_feature_color();
    let solid = module_prisms(
        kernel,
        matrix,
        center,
        module,
        color,
        p.thickness / 2.0,
        p.island_h,
    )?;
    let meta = FeatureMeta {
        module_size: module,
        quiet_zone: matrix.quiet_zone(),
        feature_count: matrix.count(color),
        payload_digest: matrix.payload_digest().to_string(),
    };
    Ok((solid, meta))
}

/// The two half-depth stacks of the dual-sided mirrored mode.
///
/// `front` has already been mirrored across the plate's vertical symmetry
/// plane; `combined` is front ∪ back, ready to cut from or union with the
/// body.
#[derive(Debug, Clone)]
pub struct DualStacks {
    pub front: SolidHandle,
    pub back: SolidHandle,
    pub combined: SolidHandle,
}

/// Dual-sided mirrored feature stacks.
///
/// Each feature module becomes two prisms of depth `(thickness - web) / 2`,
/// one per face, separated by the solid central web so the stacks never fuse
/// into a through-hole. The front stack is mirrored across the vertical
/// symmetry plane before the union; without that mirror the part stays
/// watertight but reads as garbage from the reverse face.
pub fn dual_mirrored_features(
    kernel: &mut dyn Kernel,
    p: &Params,
    matrix: &CodeMatrix,
    center: (f64, f64),
    avail: (f64, f64),
) -> Result<(DualStacks, FeatureMeta), BuildError> {
    let module = module_size(matrix, avail);
    let color = p.effective_feature_color();
    let half_depth = (p.thickness - p.web_thickness) / 2.0;

    let front_raw = module_prisms(
        kernel,
        matrix,
        center,
        module,
        color,
        -p.thickness / 2.0,
        half_depth,
    )?;
    let back = module_prisms(
        kernel,
        matrix,
        center,
        module,
        color,
        p.thickness / 2.0 - half_depth,
        half_depth,
    )?;

    let front = kernel.mirror_x(&front_raw)?;
    let combined = kernel.union(&front, &back)?;

    let meta = FeatureMeta {
        module_size: module,
        quiet_zone: matrix.quiet_zone(),
        feature_count: matrix.count(color),
        payload_digest: matrix.payload_digest().to_string(),
    };
    Ok((
        DualStacks {
            front,
            back,
            combined,
        },
        meta,
    ))
}

/// Uniform module edge length for the available footprint.
pub fn module_size(matrix: &CodeMatrix, (avail_w, avail_h): (f64, f64)) -> f64 {
    avail_w.min(avail_h) / matrix.side() as f64
}

/// Union of one prism per feature-colored module.
fn module_prisms(
    kernel: &mut dyn Kernel,
    matrix: &CodeMatrix,
    (cx, cy): (f64, f64),
    module: f64,
    color: tag_types::ModuleColor,
    base_z: f64,
    height: f64,
) -> Result<SolidHandle, BuildError> {
    let extent = module * matrix.side() as f64;
    let mut solid: Option<SolidHandle> = None;
    for (row, col) in matrix.positions(color) {
        let x = cx - extent / 2.0 + (col as f64 + 0.5) * module;
        let y = cy + extent / 2.0 - (row as f64 + 0.5) * module;
        let prism = kernel.extrude(
            &Profile::Rect {
                cx: x,
                cy: y,
                w: module,
                h: module,
            },
            base_z,
            height,
        )?;
        solid = Some(match solid {
            Some(acc) => kernel.union(&acc, &prism)?,
            None => prism,
        });
    }
    solid.ok_or(BuildError::Empty)
}

fn rect_ring(cx: f64, cy: f64, w: f64, h: f64) -> Vec<[f64; 2]> {
    let (hw, hh) = (w / 2.0, h / 2.0);
    vec![
        [cx - hw, cy - hh],
        [cx + hw, cy - hh],
        [cx + hw, cy + hh],
        [cx - hw, cy + hh],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_payload;
    use tag_kernel::MockKernel;
    use tag_types::{CodeMode, ModuleColor};

    fn matrix() -> CodeMatrix {
        encode_payload("HELLO-WORLD-1234", 4).unwrap()
    }

    #[test]
    fn island_count_matches_encoder_count() {
        let p = Params::default();
        let m = matrix();
        let mut kernel = MockKernel::new();
        let (solid, meta) =
            island_features(&mut kernel, &p, &m, (0.0, 0.0), (p.code_w, p.code_h)).unwrap();

        assert_eq!(meta.feature_count, m.dark_count());
        assert_eq!(kernel.boxes(&solid).unwrap().len(), m.dark_count());
    }

    #[test]
    fn modules_are_uniform_and_sized_by_the_smaller_axis() {
        let p = Params::default();
        let m = matrix();
        let mut kernel = MockKernel::new();
        let (solid, meta) =
            island_features(&mut kernel, &p, &m, (0.0, 0.0), (50.0, 30.0)).unwrap();

        assert!((meta.module_size - 30.0 / m.side() as f64).abs() < 1e-12);
        for b in kernel.boxes(&solid).unwrap() {
            let size = b.size();
            assert!((size[0] - meta.module_size).abs() < 1e-9);
            assert!((size[1] - meta.module_size).abs() < 1e-9);
            assert!((size[2] - p.island_h).abs() < 1e-9);
        }
    }

    #[test]
    fn islands_sit_flush_on_the_front_face() {
        let p = Params::default();
        let m = matrix();
        let mut kernel = MockKernel::new();
        let (solid, _) =
            island_features(&mut kernel, &p, &m, (0.0, 0.0), (p.code_w, p.code_h)).unwrap();
        for b in kernel.boxes(&solid).unwrap() {
            assert!((b.min[2] - p.thickness / 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn top_row_lands_above_bottom_row() {
        let p = Params::default();
        let side = 3;
        // Dark module in row 0 and row 2 only.
        let mut modules = vec![false; side * side];
        modules[1] = true; // row 0, col 1
        modules[side * 2 + 1] = true; // row 2, col 1
        let m = CodeMatrix::new(side, 0, modules, "d".into());

        let mut kernel = MockKernel::new();
        let (solid, _) = island_features(&mut kernel, &p, &m, (0.0, 0.0), (30.0, 30.0)).unwrap();
        let boxes = kernel.boxes(&solid).unwrap();
        assert_eq!(boxes.len(), 2);
        assert!(boxes[0].center()[1] > boxes[1].center()[1], "row 0 is top");
    }

    #[test]
    fn dual_stacks_leave_the_central_web() {
        let p = Params {
            code_mode: CodeMode::DualMirrored,
            ..Params::default()
        };
        let m = matrix();
        let mut kernel = MockKernel::new();
        let (stacks, _) =
            dual_mirrored_features(&mut kernel, &p, &m, (0.0, 0.0), (p.code_w, p.code_h))
                .unwrap();

        let half = (p.thickness - p.web_thickness) / 2.0;
        for b in kernel.boxes(&stacks.front).unwrap() {
            assert!((b.min[2] + p.thickness / 2.0).abs() < 1e-9);
            assert!((b.size()[2] - half).abs() < 1e-9);
        }
        for b in kernel.boxes(&stacks.back).unwrap() {
            assert!((b.max[2] - p.thickness / 2.0).abs() < 1e-9);
            assert!((b.size()[2] - half).abs() < 1e-9);
        }
        // Gap between the stacks is exactly the web.
        let front_top = kernel.boxes(&stacks.front).unwrap()[0].max[2];
        let back_bottom = kernel.boxes(&stacks.back).unwrap()[0].min[2];
        assert!((back_bottom - front_top - p.web_thickness).abs() < 1e-9);
    }

    #[test]
    fn front_stack_is_mirrored_before_union() {
        let p = Params {
            code_mode: CodeMode::DualMirrored,
            ..Params::default()
        };
        let m = matrix();
        let center = (-10.0, 0.0);
        let mut kernel = MockKernel::new();
        let (stacks, _) =
            dual_mirrored_features(&mut kernel, &p, &m, center, (30.0, 30.0)).unwrap();

        let front = kernel.boxes(&stacks.front).unwrap().to_vec();
        let back = kernel.boxes(&stacks.back).unwrap().to_vec();
        assert_eq!(front.len(), back.len());
        // Module k of the front stack must sit at the reflection of module k
        // of the back stack; identical x positions would read mirrored from
        // the reverse face.
        for (f, b) in front.iter().zip(back.iter()) {
            assert!((f.center()[0] + b.center()[0]).abs() < 1e-9);
            assert!((f.center()[1] - b.center()[1]).abs() < 1e-9);
        }
        let has_offset = back.iter().any(|b| b.center()[0].abs() > 1e-6);
        assert!(has_offset, "test needs off-axis modules to be meaningful");
    }

    #[test]
    fn dual_mode_features_light_modules_by_default() {
        let p = Params {
            code_mode: CodeMode::DualMirrored,
            ..Params::default()
        };
        let m = matrix();
        let mut kernel = MockKernel::new();
        let (_, meta) =
            dual_mirrored_features(&mut kernel, &p, &m, (0.0, 0.0), (30.0, 30.0)).unwrap();
        assert_eq!(meta.feature_count, m.count(ModuleColor::Light));
    }

    #[test]
    fn ring_spans_plate_and_cuts_strap() {
        let p = Params::default();
        let mut kernel = MockKernel::new();
        let ring = ring_features(&mut kernel, &p).unwrap();
        let (min, max) = kernel.bounding_box(&ring).unwrap();
        assert!((max[0] - min[0] - p.plate_w()).abs() < 1e-9);
        assert!((min[2] - p.thickness / 2.0).abs() < 1e-9);
        assert!((max[2] - p.thickness / 2.0 - p.island_h).abs() < 1e-9);
        assert_eq!(kernel.cut_count(&ring), Some(1));
    }
}
