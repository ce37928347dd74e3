//! Solid synthesis for the tag: plate body, code-matrix features, text
//! features, and the boolean composition of output variants.
//!
//! Everything here drives a `&mut dyn Kernel`; no file IO, no tessellation.

pub mod body;
pub mod code;
pub mod compose;
pub mod encode;
pub mod text;
pub mod types;

pub use body::build_body;
pub use code::{dual_mirrored_features, island_features, ring_features, DualStacks};
pub use compose::{compose_variant, ComposedSolid};
pub use encode::encode_payload;
pub use text::TextSystem;
pub use types::{BuildError, EncodeError, FeatureMeta, TextError};
