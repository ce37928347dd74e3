pub mod matrix;
pub mod params;
pub mod presets;

pub use matrix::{CodeMatrix, ModuleColor};
pub use params::{CodeMode, ConfigError, ParamError, Params, TextEdge, TextStyle, Variant};
pub use presets::apply_preset;
