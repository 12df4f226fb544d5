//! Handles all user-facing output for the CLI.
//!
//! Outlines, annotation listings and per-step status lines are written
//! here so every command renders the same way.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::annotation::Annotation;
use crate::generator::GenerationResult;
use crate::section::SectionedTemplate;

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Prints the indented outline of a section tree.
pub fn print_outline(tree: &SectionedTemplate) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    write_heading(&mut stdout, &tree.template_name)?;
    write!(stdout, "{}", tree.outline())
}

/// Prints a section tree as pretty JSON.
pub fn print_json(tree: &SectionedTemplate) -> io::Result<()> {
    let json = serde_json::to_string_pretty(tree).map_err(io::Error::other)?;
    println!("{json}");
    Ok(())
}

/// Prints one annotation per line with its offsets.
pub fn print_annotations(template_name: &str, annotations: &[Annotation]) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    write_heading(&mut stdout, template_name)?;
    for annotation in annotations {
        writeln!(stdout, "{annotation}")?;
    }
    Ok(())
}

/// Prints a coloured status line per generation step.
pub fn print_results(results: &[GenerationResult]) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for result in results {
        let (label, color) = if result.is_ok() {
            ("ok", Color::Green)
        } else {
            ("error", Color::Red)
        };
        stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(stdout, "{label:>5}")?;
        stdout.reset()?;
        write!(stdout, " {}", result.template_name)?;
        match (&result.tree, &result.error) {
            (Some(tree), _) => writeln!(stdout, " ({} top-level sections)", tree.root.children.len())?,
            (_, Some(error)) => writeln!(stdout, ": {error}")?,
            _ => writeln!(stdout)?,
        }
    }
    Ok(())
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn write_heading(stdout: &mut StandardStream, name: &str) -> io::Result<()> {
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
    writeln!(stdout, "--- {name} ---")?;
    stdout.reset()
}
