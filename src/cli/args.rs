//! Defines the command-line arguments and subcommands for the sectionize CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::generator::GenerationStep;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "sectionize",
    version,
    about = "Splits annotated templates into named section trees."
)]
pub struct SectionizeArgs {
    /// Increase log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the section tree of a template.
    Tree {
        /// The template file to sectionize.
        #[arg(required = true)]
        template: PathBuf,
        /// The YAML or JSON generator config.
        #[arg(short, long)]
        config: PathBuf,
        /// Print the tree as JSON instead of an outline.
        #[arg(long)]
        json: bool,
    },
    /// Print the annotation stream the front end produces for a template.
    Annotations {
        /// The template file to scan.
        #[arg(required = true)]
        template: PathBuf,
        /// The YAML or JSON generator config.
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Run a batch of generation steps and report each one's status.
    Generate {
        /// A step in the form TEMPLATE::CONFIG. May be repeated.
        #[arg(short, long = "step", required = true)]
        steps: Vec<GenerationStep>,
    },
}
