//! Command-line parsing for the model generator.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the authoring/patching code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::DEFAULT_OUTPUT_FILE;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "vibegen",
    version,
    about = "Updatable on-device vibe-classifier model generator"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the authoring pipeline and write the model artifact.
    Generate(GenerateArgs),
    /// Decode a saved artifact and print its declarations and training wiring.
    ///
    /// Read-only diagnostics; performs no transformation.
    Inspect(InspectArgs),
}

/// Options for model generation.
#[derive(Debug, Parser, Clone)]
pub struct GenerateArgs {
    /// Training dataset CSV. When omitted, the known locations are probed in
    /// priority order.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Output artifact path.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Weight-initialization seed for reproducible runs.
    ///
    /// By default no seed is fixed: repeated runs produce identical topology
    /// but different weights.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Author recorded in the artifact metadata.
    #[arg(long, default_value = "Vibe Assistant")]
    pub author: String,

    /// License recorded in the artifact metadata.
    #[arg(long, default_value = "MIT")]
    pub license: String,

    /// Description recorded in the artifact metadata.
    #[arg(long, default_value = "Updatable MLP classifier for vibe prediction")]
    pub description: String,

    /// Export a JSON summary of the generated model.
    #[arg(long = "export-summary")]
    pub export_summary: Option<PathBuf>,
}

/// Options for inspecting a saved artifact.
#[derive(Debug, Parser)]
pub struct InspectArgs {
    /// Model artifact produced by `vibegen generate`.
    pub model: PathBuf,
}
