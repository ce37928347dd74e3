//! End-to-end pipeline runs against the deterministic mock kernel.

use std::fs;
use std::path::PathBuf;

use tag_kernel::MockKernel;
use tag_modeling::encode_payload;
use tag_pipeline::{parse_svg_diagram, run_build, run_diagram_build, BuildRequest, PipelineError};
use tag_types::{CodeMode, Params, Variant};

fn islands_request(out: PathBuf) -> BuildRequest {
    let params = Params {
        payload: "HELLO-WORLD-1234".into(),
        quiet_zone: 4,
        code_mode: CodeMode::Islands,
        ..Params::default()
    };
    BuildRequest::new(params, Variant::Islands, out)
}

#[test]
fn manifest_records_the_encoder_dark_count() {
    let dir = tempfile::tempdir().unwrap();
    let req = islands_request(dir.path().join("out"));
    let mut kernel = MockKernel::new();
    let report = run_build(&mut kernel, &req).unwrap();

    let matrix = encode_payload("HELLO-WORLD-1234", 4).unwrap();
    let code = report.code.expect("islands build records code metadata");
    assert_eq!(code.feature_count, matrix.dark_count());
    assert_eq!(code.quiet_zone, 4);

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report.manifest_path).unwrap()).unwrap();
    assert_eq!(
        manifest["code"]["feature_count"].as_u64().unwrap() as usize,
        matrix.dark_count()
    );
    // The manifest never echoes the payload text.
    assert!(!fs::read_to_string(&report.manifest_path)
        .unwrap()
        .contains("HELLO-WORLD-1234"));

    assert!(dir.path().join("out/tag_alt_qr_islands_base.stl").exists());
    assert!(dir
        .path()
        .join("out/tag_alt_qr_islands_features.stl")
        .exists());
}

#[test]
fn repeated_builds_hash_identically() {
    let dir = tempfile::tempdir().unwrap();
    let req_a = islands_request(dir.path().join("a"));
    let req_b = islands_request(dir.path().join("b"));

    let report_a = run_build(&mut MockKernel::new(), &req_a).unwrap();
    let report_b = run_build(&mut MockKernel::new(), &req_b).unwrap();

    assert_eq!(report_a.files.len(), report_b.files.len());
    for (name, entry) in &report_a.files {
        assert_eq!(entry.sha256, report_b.files[name].sha256, "{name}");
    }

    // Deterministic mode means the manifests are byte-identical too.
    let a = fs::read(report_a.manifest_path).unwrap();
    let b = fs::read(report_b.manifest_path).unwrap();
    assert_eq!(a, b);
}

#[test]
fn invalid_pockets_abort_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let params = Params {
        thickness: 3.0,
        recess_depth: 2.8,
        pocket_depth: 0.5,
        ..Params::default()
    };
    let req = BuildRequest::new(params, Variant::Flat, out.clone());
    let err = run_build(&mut MockKernel::new(), &req).unwrap_err();

    assert!(matches!(err, PipelineError::Param(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("thickness - 0.6"));
    assert!(!out.exists(), "no partial output on validation failure");
}

#[test]
fn empty_payload_falls_back_to_the_ring_frame() {
    let dir = tempfile::tempdir().unwrap();
    let req = BuildRequest::new(Params::default(), Variant::Base, dir.path().join("out"));
    let report = run_build(&mut MockKernel::new(), &req).unwrap();

    assert!(report.code.is_none());
    assert_eq!(report.files.len(), 1);
    assert!(report.files.contains_key("tag_base.stl"));
}

#[test]
fn checksum_list_is_sorted_and_consistent_with_the_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let params = Params {
        payload: "DEMO".into(),
        ..Params::default()
    };
    let req = BuildRequest::new(params, Variant::All, out.clone());
    let report = run_build(&mut MockKernel::new(), &req).unwrap();

    let sums = fs::read_to_string(out.join("SHA256SUMS")).unwrap();
    let names: Vec<&str> = sums
        .lines()
        .map(|l| l.split_once("  ").unwrap().1)
        .collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert_eq!(names.len(), report.files.len());
    for line in sums.lines() {
        let (hash, name) = line.split_once("  ").unwrap();
        assert_eq!(hash, report.files[name].sha256);
    }
}

#[test]
fn strict_build_fails_when_the_font_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let params = Params {
        font_path: Some("/nonexistent/font.ttf".into()),
        ..Params::default()
    };
    let req = BuildRequest::new(params, Variant::Flat, dir.path().join("out"));
    let err = run_build(&mut MockKernel::new(), &req).unwrap_err();
    assert!(matches!(err, PipelineError::ExternalToolUnavailable { .. }));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn permissive_build_degrades_without_the_font() {
    let dir = tempfile::tempdir().unwrap();
    let params = Params {
        font_path: Some("/nonexistent/font.ttf".into()),
        ..Params::default()
    };
    let mut req = BuildRequest::new(params, Variant::Flat, dir.path().join("out"));
    req.strict = false;
    let report = run_build(&mut MockKernel::new(), &req).unwrap();
    assert!(report
        .warnings
        .iter()
        .any(|w| w.contains("font unavailable")));
    assert!(report.files.contains_key("tag_alt_flat_front.stl"));
}

#[test]
fn dual_mirrored_build_produces_a_flush_two_piece_set() {
    let dir = tempfile::tempdir().unwrap();
    let params = Params {
        payload: "DEMO".into(),
        code_mode: CodeMode::DualMirrored,
        ..Params::default()
    };
    let req = BuildRequest::new(params, Variant::Islands, dir.path().join("out"));
    let report = run_build(&mut MockKernel::new(), &req).unwrap();
    assert!(report.files.contains_key("tag_alt_qr_islands_base.stl"));
    assert!(report.files.contains_key("tag_alt_qr_islands_features.stl"));
}

#[test]
fn diagram_build_writes_its_own_output_pair() {
    const SVG: &str = r#"<svg width="240" height="94">
      <g id="base-outline">
        <rect class="base-shape" x="0" y="0" width="240" height="94" rx="4"/>
      </g>
      <g id="qr-modules">
        <rect class="qr-module" x="10" y="10" width="2" height="2"/>
        <rect class="qr-module" x="14" y="14" width="2" height="2"/>
      </g>
    </svg>"#;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let diagram = parse_svg_diagram(SVG).unwrap();
    let req = BuildRequest::new(Params::default(), Variant::Base, out.clone());
    let report = run_diagram_build(&mut MockKernel::new(), &req, &diagram).unwrap();

    assert!(report.files.contains_key("svg_tag_base.stl"));
    assert!(report.files.contains_key("svg_tag_features.stl"));
    assert!(out.join("manifest.json").exists());
    assert!(out.join("SHA256SUMS").exists());
}
