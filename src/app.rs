//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the authoring pipeline
//! - prints the run summary and any patch-audit warnings
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{Command, GenerateArgs, InspectArgs};
use crate::domain::{DEFAULT_CSV_CANDIDATES, GenConfig, ModelMetadata};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `vibegen` binary.
pub fn run() -> Result<(), AppError> {
    // We want bare `vibegen` (and `vibegen --seed 7`) to behave like
    // `vibegen generate ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Generate(args) => handle_generate(args),
        Command::Inspect(args) => handle_inspect(args),
    }
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = gen_config_from_args(&args);
    let run = pipeline::run_generate(&config)?;

    // Patch corrections are an audit trail of builder drift; surface them on
    // stderr so they survive output redirection.
    for note in &run.patch_notes {
        eprintln!("warning: {note}");
    }

    println!(
        "{}",
        crate::report::format_run_summary(&run.schema, &run.graph, &run.training, &config.output)
    );

    if let Some(path) = &config.export_summary {
        let summary =
            crate::io::summary::build_summary(&run.graph, &run.training, &config.metadata);
        crate::io::summary::write_summary_json(path, &summary)?;
    }

    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), AppError> {
    let model = crate::io::model_file::read_model(&args.model)?;
    print!("{}", crate::report::format_model_report(&model));
    Ok(())
}

pub fn gen_config_from_args(args: &GenerateArgs) -> GenConfig {
    let csv_candidates = match &args.csv {
        Some(path) => vec![path.clone()],
        None => DEFAULT_CSV_CANDIDATES.iter().copied().map(PathBuf::from).collect(),
    };

    GenConfig {
        csv_candidates,
        output: args.output.clone(),
        seed: args.seed,
        metadata: ModelMetadata {
            author: args.author.clone(),
            license: args.license.clone(),
            description: args.description.clone(),
        },
        export_summary: args.export_summary.clone(),
    }
}

/// Rewrite argv so `vibegen` defaults to `vibegen generate`.
///
/// Rules:
/// - `vibegen`                     -> `vibegen generate`
/// - `vibegen --seed 7 ...`        -> `vibegen generate --seed 7 ...`
/// - `vibegen --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("generate".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "generate" | "inspect");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "generate flags".
    if arg1.starts_with('-') {
        argv.insert(1, "generate".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
