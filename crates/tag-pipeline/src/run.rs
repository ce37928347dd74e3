use std::collections::BTreeMap;
use std::fs;

use tracing::{info, warn};

use mesh_check::validate_mesh;
use tag_kernel::{Kernel, SolidHandle};
use tag_layout::{layout_from_config, solve, Layout};
use tag_modeling::body::CUT_EPS;
use tag_modeling::text::engrave_guard;
use tag_modeling::{
    build_body, compose_variant, dual_mirrored_features, encode_payload, island_features,
    ring_features, BuildError, FeatureMeta, TextSystem,
};
use tag_output::{
    canonicalize, color_switch_layer_index, export_binary_stl, sha256_hex, write_checksums,
    write_manifest, CodeSummary, FileEntry, Manifest,
};
use tag_types::{CodeMode, Params, TextStyle};

use crate::diagram::{build_diagram_solids, Diagram};
use crate::error::PipelineError;
use crate::request::BuildRequest;

/// Tessellation tolerance, fixed so output is identical across runs and
/// machines for the same parameter set.
pub const TESSELLATION_TOLERANCE: f64 = 0.01;

/// What one invocation produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub files: BTreeMap<String, FileEntry>,
    pub manifest_path: std::path::PathBuf,
    pub warnings: Vec<String>,
    pub code: Option<CodeSummary>,
}

/// Run one full parametric build.
///
/// Ordering is strictly sequential; the body and feature solids are built
/// once and shared by every requested variant.
pub fn run_build(kernel: &mut dyn Kernel, req: &BuildRequest) -> Result<BuildReport, PipelineError> {
    req.params.validate()?;
    let p = &req.params;
    let mut warnings = Vec::new();

    let text_system = load_text_system(p, req.strict, &mut warnings)?;

    let layout = match &req.layout_config {
        Some(cfg) => layout_from_config(cfg)?,
        None => solve(p, &text_system)?,
    };

    let body_build = build_body(kernel, p)?;
    warnings.extend(body_build.warnings);
    let mut body = body_build.solid;

    let center = (layout.code.cx, layout.code.cy);
    let avail = (layout.code.w, layout.code.h);

    // Without a payload there is nothing to encode; the legacy ring frame
    // stands in.
    let mode = if p.payload.is_empty() {
        CodeMode::Ring
    } else {
        p.code_mode
    };
    let (features, meta, recessed): (SolidHandle, Option<FeatureMeta>, bool) = match mode {
        CodeMode::Ring => (ring_features(kernel, p)?, None, false),
        CodeMode::Islands => {
            let matrix = encode_payload(&p.payload, p.quiet_zone)?;
            let (solid, meta) = island_features(kernel, p, &matrix, center, avail)?;
            (solid, Some(meta), false)
        }
        CodeMode::DualMirrored => {
            let matrix = encode_payload(&p.payload, p.quiet_zone)?;
            let (stacks, meta) = dual_mirrored_features(kernel, p, &matrix, center, avail)?;
            (stacks.combined, Some(meta), true)
        }
    };

    body = apply_text(kernel, p, &text_system, &layout, body, req.strict, &mut warnings)?;

    let composed = compose_variant(kernel, req.variant, &body, &features, recessed)?;
    let pieces: Vec<(String, SolidHandle)> = composed
        .into_iter()
        .map(|c| (c.file_name.to_string(), c.solid))
        .collect();

    let code = meta.map(|m| CodeSummary {
        module_size: m.module_size,
        quiet_zone: m.quiet_zone,
        feature_count: m.feature_count,
        payload_sha256: m.payload_digest,
        color_switch_layer: color_switch_layer_index(p.island_h, p.layer_height),
    });

    finalize(kernel, req, pieces, code, warnings)
}

/// Run a build from an imported layered diagram instead of parametric
/// layout. The diagram is authoritative for all 2D geometry; the parameter
/// set still supplies thickness, web, and policy.
pub fn run_diagram_build(
    kernel: &mut dyn Kernel,
    req: &BuildRequest,
    diagram: &Diagram,
) -> Result<BuildReport, PipelineError> {
    req.params.validate()?;
    let p = &req.params;
    let mut warnings = Vec::new();

    let text_system = load_text_system(p, req.strict, &mut warnings)?;
    let build = build_diagram_solids(
        kernel,
        diagram,
        p.thickness,
        p.web_thickness,
        if text_system.has_font() {
            Some(&text_system)
        } else {
            None
        },
        &mut warnings,
    )?;

    let pieces = vec![
        ("svg_tag_base.stl".to_string(), build.base),
        ("svg_tag_features.stl".to_string(), build.features),
    ];
    finalize(kernel, req, pieces, None, warnings)
}

/// Tessellate, canonicalize, validate, hash, then write everything at once.
/// Nothing touches the filesystem until every mesh has been serialized.
fn finalize(
    kernel: &mut dyn Kernel,
    req: &BuildRequest,
    pieces: Vec<(String, SolidHandle)>,
    code: Option<CodeSummary>,
    mut warnings: Vec<String>,
) -> Result<BuildReport, PipelineError> {
    let mut files = BTreeMap::new();
    let mut blobs = Vec::with_capacity(pieces.len());

    for (name, solid) in &pieces {
        let mesh = kernel.tessellate(solid, TESSELLATION_TOLERANCE)?;
        let mesh = canonicalize(&mesh);

        let report = validate_mesh(&mesh);
        if !report.is_printable() {
            let reason = report
                .first_failure()
                .unwrap_or("unknown integrity failure")
                .to_string();
            if req.strict {
                return Err(PipelineError::GeometryIntegrity {
                    file: name.clone(),
                    reason,
                });
            }
            warn!(file = %name, %reason, "integrity check failed, continuing");
            warnings.push(format!("{name}: {reason}"));
        }

        let bytes = export_binary_stl(&mesh, name)?;
        files.insert(
            name.clone(),
            FileEntry {
                sha256: sha256_hex(&bytes),
            },
        );
        blobs.push((name.clone(), bytes));
    }

    fs::create_dir_all(&req.out_dir).map_err(tag_output::OutputError::from)?;
    for (name, bytes) in &blobs {
        fs::write(req.out_dir.join(name), bytes).map_err(tag_output::OutputError::from)?;
    }

    // The echoed snapshot never carries the raw payload; traceability goes
    // through the digest in the code summary.
    let mut params_echo = req.params.clone();
    params_echo.payload.clear();

    let mut manifest = Manifest::new(req.variant, params_echo, req.deterministic);
    manifest.files = files.clone();
    manifest.code = code.clone();
    manifest.warnings = warnings.clone();
    let manifest_path = write_manifest(&req.out_dir, &manifest)?;
    write_checksums(&req.out_dir, &files)?;

    info!(
        out_dir = %req.out_dir.display(),
        files = files.len(),
        "build complete"
    );

    Ok(BuildReport {
        files,
        manifest_path,
        warnings,
        code,
    })
}

fn load_text_system(
    p: &Params,
    strict: bool,
    warnings: &mut Vec<String>,
) -> Result<TextSystem, PipelineError> {
    match TextSystem::load(p.font_path.as_deref()) {
        Ok(ts) => Ok(ts),
        Err(e) => {
            if strict {
                return Err(PipelineError::ExternalToolUnavailable {
                    what: e.to_string(),
                });
            }
            warn!(error = %e, "font unavailable, continuing with heuristic measurement");
            warnings.push(format!("font unavailable: {e}"));
            Ok(TextSystem::heuristic())
        }
    }
}

/// Fold text features into the body: emboss unions, engrave cuts. Back-face
/// lines are mirrored across the symmetry plane so they read correctly from
/// the reverse side.
fn apply_text(
    kernel: &mut dyn Kernel,
    p: &Params,
    ts: &TextSystem,
    layout: &Layout,
    mut body: SolidHandle,
    strict: bool,
    warnings: &mut Vec<String>,
) -> Result<SolidHandle, PipelineError> {
    if layout.front_lines.is_empty() && layout.back_lines.is_empty() {
        return Ok(body);
    }
    if !ts.has_font() {
        if strict {
            return Err(PipelineError::ExternalToolUnavailable {
                what: "text features require a font file".to_string(),
            });
        }
        warn!("no font loaded, skipping text features");
        warnings.push("text features skipped: no font loaded".to_string());
        return Ok(body);
    }

    let t = p.thickness;
    for line in &layout.front_lines {
        body = match p.front_style {
            TextStyle::Emboss => {
                let solid = ts.line_solid(kernel, line, t / 2.0, p.front_feature_h)?;
                kernel.union(&body, &solid).map_err(BuildError::from)?
            }
            TextStyle::Engrave => {
                engrave_guard(p, p.front_depth).map_err(BuildError::from)?;
                let tool =
                    ts.line_solid(kernel, line, t / 2.0 - p.front_depth, p.front_depth + CUT_EPS)?;
                kernel.subtract(&body, &tool).map_err(BuildError::from)?
            }
        };
    }

    for line in &layout.back_lines {
        body = match p.back_style {
            TextStyle::Emboss => {
                let solid = ts.line_solid(kernel, line, -t / 2.0 - p.front_feature_h, p.front_feature_h)?;
                let mirrored = kernel.mirror_x(&solid).map_err(BuildError::from)?;
                kernel.union(&body, &mirrored).map_err(BuildError::from)?
            }
            TextStyle::Engrave => {
                engrave_guard(p, p.front_depth).map_err(BuildError::from)?;
                let tool =
                    ts.line_solid(kernel, line, -t / 2.0 - CUT_EPS, p.front_depth + CUT_EPS)?;
                let mirrored = kernel.mirror_x(&tool).map_err(BuildError::from)?;
                kernel.subtract(&body, &mirrored).map_err(BuildError::from)?
            }
        };
    }

    Ok(body)
}
