//! Sequential build pipeline: validate → layout → build solids → compose
//! variants → tessellate/validate/hash → write files → write manifest.
//!
//! Single-threaded and strictly ordered. Validation-class failures abort
//! before any output exists; integrity failures abort only in strict mode.

pub mod diagram;
pub mod error;
pub mod request;
pub mod run;

pub use diagram::{build_diagram_solids, parse_svg_diagram, Diagram, DiagramBuild};
pub use error::PipelineError;
pub use request::BuildRequest;
pub use run::{run_build, run_diagram_build, BuildReport, TESSELLATION_TOLERANCE};
