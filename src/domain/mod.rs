//! Domain types for the model-authoring pipeline.

pub mod types;

pub use types::*;
