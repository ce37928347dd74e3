//! Command-line front end for the tag model generator.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tag_kernel::TruckKernel;
use tag_layout::LayoutConfig;
use tag_pipeline::{parse_svg_diagram, run_build, run_diagram_build, BuildReport, BuildRequest, PipelineError};
use tag_types::{apply_preset, CodeMode, Params, Variant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VariantArg {
    All,
    Base,
    Flat,
    Islands,
}

impl From<VariantArg> for Variant {
    fn from(v: VariantArg) -> Self {
        match v {
            VariantArg::All => Variant::All,
            VariantArg::Base => Variant::Base,
            VariantArg::Flat => Variant::Flat,
            VariantArg::Islands => Variant::Islands,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CodeModeArg {
    Ring,
    Islands,
    DualMirrored,
}

impl From<CodeModeArg> for CodeMode {
    fn from(m: CodeModeArg) -> Self {
        match m {
            CodeModeArg::Ring => CodeMode::Ring,
            CodeModeArg::Islands => CodeMode::Islands,
            CodeModeArg::DualMirrored => CodeMode::DualMirrored,
        }
    }
}

/// Generate manufacturable dual-material ID tag solids.
#[derive(Debug, Parser)]
#[command(name = "tag-models", version)]
struct Cli {
    /// Output directory.
    #[arg(long, default_value = "outputs")]
    out: PathBuf,

    /// Which output set to build.
    #[arg(long, value_enum, default_value_t = VariantArg::All)]
    variant: VariantArg,

    /// Parameter file (JSON, any subset of fields).
    #[arg(long)]
    params: Option<PathBuf>,

    /// Material preset: pla, petg, abs.
    #[arg(long)]
    preset: Option<String>,

    /// Payload string for the code. Empty builds the legacy ring frame.
    #[arg(long)]
    payload: Option<String>,

    #[arg(long)]
    quiet_zone: Option<u32>,

    #[arg(long, value_enum)]
    code_mode: Option<CodeModeArg>,

    #[arg(long)]
    code_w: Option<f64>,
    #[arg(long)]
    code_h: Option<f64>,
    #[arg(long)]
    border: Option<f64>,
    #[arg(long)]
    thickness: Option<f64>,
    #[arg(long)]
    min_wall: Option<f64>,
    #[arg(long)]
    corner_r: Option<f64>,
    #[arg(long)]
    recess_d: Option<f64>,
    #[arg(long)]
    recess_depth: Option<f64>,
    #[arg(long)]
    pocket_depth: Option<f64>,
    #[arg(long)]
    fit_clearance: Option<f64>,
    #[arg(long)]
    strap_hole_d: Option<f64>,
    #[arg(long)]
    island_h: Option<f64>,
    #[arg(long)]
    web_thickness: Option<f64>,
    #[arg(long)]
    layer_height: Option<f64>,

    /// Strap slot as WIDTHxLENGTH, e.g. 4x12. Replaces the hole.
    #[arg(long)]
    slot: Option<String>,

    /// Font file for text features and exact measurement.
    #[arg(long)]
    font: Option<PathBuf>,

    #[arg(long)]
    front_text: Option<String>,
    #[arg(long)]
    back_name: Option<String>,
    #[arg(long)]
    back_phone: Option<String>,
    #[arg(long)]
    back_address: Option<String>,

    /// Layered SVG diagram; replaces parametric layout and body synthesis.
    #[arg(long)]
    diagram: Option<PathBuf>,

    /// Collaborator layout config JSON; authoritative over parametric
    /// layout when present.
    #[arg(long)]
    layout_config: Option<PathBuf>,

    /// Log integrity failures and continue instead of aborting.
    /// Preview builds only.
    #[arg(long)]
    permissive: bool,

    /// Include wall-clock metadata in the manifest (breaks byte-for-byte
    /// reproducibility).
    #[arg(long)]
    timestamped: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid parameter file: {0}")]
    BadParams(String),

    #[error("invalid --slot '{value}', expected WIDTHxLENGTH")]
    BadSlot { value: String },
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Pipeline(e) => e.exit_code(),
            _ => 2,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(report) => {
            for (name, entry) in &report.files {
                println!("{}  {}", entry.sha256, name);
            }
            for warning in &report.warnings {
                eprintln!("warning: {warning}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> Result<BuildReport, CliError> {
    let params = resolve_params(&cli)?;
    let variant = cli.variant.into();

    let layout_config = match &cli.layout_config {
        Some(path) => {
            let json = read(path)?;
            Some(LayoutConfig::from_json_str(&json).map_err(PipelineError::from)?)
        }
        None => None,
    };

    let request = BuildRequest {
        params,
        variant,
        out_dir: cli.out.clone(),
        strict: !cli.permissive,
        deterministic: !cli.timestamped,
        layout_config,
    };

    let mut kernel = TruckKernel::new();
    let report = match &cli.diagram {
        Some(path) => {
            let svg = read(path)?;
            let diagram = parse_svg_diagram(&svg)?;
            info!(modules = diagram.modules.len(), "building from diagram");
            run_diagram_build(&mut kernel, &request, &diagram)?
        }
        None => run_build(&mut kernel, &request)?,
    };
    Ok(report)
}

/// Merge parameters with precedence: explicit flags > preset > file >
/// defaults.
fn resolve_params(cli: &Cli) -> Result<Params, CliError> {
    let mut params = match &cli.params {
        Some(path) => {
            let json = read(path)?;
            serde_json::from_str(&json).map_err(|e| CliError::BadParams(e.to_string()))?
        }
        None => Params::default(),
    };

    if let Some(preset) = &cli.preset {
        apply_preset(&mut params, preset).map_err(PipelineError::from)?;
    }

    macro_rules! set {
        ($($field:ident),*) => {
            $(if let Some(v) = &cli.$field {
                params.$field = v.clone();
            })*
        };
    }
    set!(
        quiet_zone,
        code_w,
        code_h,
        border,
        thickness,
        min_wall,
        corner_r,
        recess_d,
        recess_depth,
        pocket_depth,
        fit_clearance,
        strap_hole_d,
        island_h,
        web_thickness,
        layer_height
    );
    if let Some(payload) = &cli.payload {
        params.payload = payload.clone();
    }
    if let Some(mode) = cli.code_mode {
        params.code_mode = mode.into();
    }
    if let Some(font) = &cli.font {
        params.font_path = Some(font.clone());
    }
    if let Some(text) = &cli.front_text {
        params.front_text = text.clone();
    }
    if let Some(name) = &cli.back_name {
        params.back_name = name.clone();
    }
    if let Some(phone) = &cli.back_phone {
        params.back_phone = phone.clone();
    }
    if let Some(address) = &cli.back_address {
        params.back_address = address.clone();
    }

    if let Some(slot) = &cli.slot {
        let (w, l) = parse_slot(slot)?;
        params.strap_slot_w = w;
        params.strap_slot_l = l;
        params.strap_hole_d = 0.0;
    }

    Ok(params)
}

fn parse_slot(value: &str) -> Result<(f64, f64), CliError> {
    let bad = || CliError::BadSlot {
        value: value.to_string(),
    };
    let (w, l) = value.to_lowercase().split_once('x').ok_or_else(bad).map(
        |(w, l)| (w.to_string(), l.to_string()),
    )?;
    let w: f64 = w.trim().parse().map_err(|_| bad())?;
    let l: f64 = l.trim().parse().map_err(|_| bad())?;
    if w <= 0.0 || l <= 0.0 {
        return Err(bad());
    }
    Ok((w, l))
}

fn read(path: &PathBuf) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })
}
