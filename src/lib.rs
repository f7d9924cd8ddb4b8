//! `vibe-modelgen` library crate.
//!
//! The binary (`vibegen`) is a thin wrapper around this library so that:
//!
//! - the authoring pipeline is testable without spawning processes
//! - modules are reusable (e.g., embedding the generator in another tool)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod graph;
pub mod io;
pub mod proto;
pub mod report;
pub mod schema;
pub mod spec;
pub mod training;
