//! The sectionize command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::Path;
use std::process;

use clap::Parser;
use tracing::debug;

use crate::cli::args::{Command, SectionizeArgs};
use crate::config::GenConfig;
use crate::diagnostics::GenerateError;
use crate::generator::{preprocess_text, sectionize_text, GenerationStep, Generator};
use crate::logging;
use crate::template::RawTemplate;

pub mod args;
pub mod output;

/// Why a command did not succeed.
enum Failure {
    Error(GenerateError),
    Io(std::io::Error),
    /// Some generation steps failed; their errors were already reported.
    StepsFailed(usize),
}

impl From<GenerateError> for Failure {
    fn from(error: GenerateError) -> Self {
        Failure::Error(error)
    }
}

impl From<std::io::Error> for Failure {
    fn from(error: std::io::Error) -> Self {
        Failure::Io(error)
    }
}

/// The main entry point for the CLI.
pub fn run() {
    let args = SectionizeArgs::parse();
    logging::init(args.verbose);
    debug!(?args, "parsed arguments");

    // Dispatch to the appropriate subcommand handler.
    let result = match args.command {
        Command::Tree { template, config, json } => handle_tree(&template, &config, json),
        Command::Annotations { template, config } => handle_annotations(&template, &config),
        Command::Generate { steps } => handle_generate(&steps),
    };

    match result {
        Ok(()) => {}
        Err(Failure::Error(error)) => {
            eprintln!("{:?}", miette::Report::new(error));
            process::exit(1);
        }
        Err(Failure::Io(error)) => {
            eprintln!("Error: {error}");
            process::exit(1);
        }
        Err(Failure::StepsFailed(count)) => {
            eprintln!("Error: {count} generation step(s) failed");
            process::exit(1);
        }
    }
}

/// Handles the `tree` subcommand.
fn handle_tree(template: &Path, config: &Path, json: bool) -> Result<(), Failure> {
    let config = GenConfig::from_file(config).map_err(GenerateError::from)?;
    let raw = RawTemplate::from_file(template)?;
    let tree = sectionize_text(&config, &raw)?;
    if json {
        output::print_json(&tree)?;
    } else {
        output::print_outline(&tree)?;
    }
    Ok(())
}

/// Handles the `annotations` subcommand.
fn handle_annotations(template: &Path, config: &Path) -> Result<(), Failure> {
    let config = GenConfig::from_file(config).map_err(GenerateError::from)?;
    let raw = RawTemplate::from_file(template)?;
    let preprocessed = preprocess_text(&config, &raw)?;
    output::print_annotations(&preprocessed.name, &preprocessed.annotations)?;
    Ok(())
}

/// Handles the `generate` subcommand.
fn handle_generate(steps: &[GenerationStep]) -> Result<(), Failure> {
    let results = Generator::new().run_batch(steps);
    output::print_results(&results)?;
    let mut failed = 0;
    for error in results.into_iter().filter_map(|r| r.error) {
        failed += 1;
        eprintln!("{:?}", miette::Report::new(error));
    }
    match failed {
        0 => Ok(()),
        failed => Err(Failure::StepsFailed(failed)),
    }
}
