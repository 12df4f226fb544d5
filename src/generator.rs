//! Generation orchestration
//!
//! A generation step pairs a template file with a config file. Each step is
//! run independently: its config is loaded, its root binding checked, its
//! template preprocessed and sectionized. A failing step is reported in its
//! result and never stops the rest of a batch.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{error, info, info_span};

use crate::config::GenConfig;
use crate::diagnostics::GenerateError;
use crate::frontend::{Preprocessor, TextPreprocessor};
use crate::section::SectionedTemplate;
use crate::sectionizer::sectionize;
use crate::template::{PreprocessedTemplate, RawTemplate};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// One `TEMPLATE::CONFIG` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationStep {
    pub template_path: PathBuf,
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    Ok,
    Error,
}

/// Outcome of a single step. Exactly one of `tree` and `error` is set.
#[derive(Debug)]
pub struct GenerationResult {
    pub template_name: String,
    pub status: GenerationStatus,
    pub tree: Option<SectionedTemplate>,
    pub error: Option<GenerateError>,
}

/// Runs generation steps through the text front end and the sectionizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Generator;

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl GenerationStep {
    pub fn new(template_path: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            config_path: config_path.into(),
        }
    }
}

impl FromStr for GenerationStep {
    type Err = GenerateError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        match spec.split_once("::") {
            Some((template, config)) if !template.is_empty() && !config.is_empty() => {
                Ok(Self::new(template, config))
            }
            _ => Err(GenerateError::InvalidStep {
                spec: spec.to_string(),
            }),
        }
    }
}

impl fmt::Display for GenerationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.template_path.display(), self.config_path.display())
    }
}

impl GenerationResult {
    pub fn is_ok(&self) -> bool {
        self.status == GenerationStatus::Ok
    }
}

impl Generator {
    pub fn new() -> Self {
        Self
    }

    pub fn run_step(&self, step: &GenerationStep) -> GenerationResult {
        let span = info_span!("step", template = %step.template_path.display());
        let _guard = span.enter();
        let template_name = step.template_path.display().to_string();

        match self.sectionize_step(step) {
            Ok(tree) => {
                info!(sections = tree.root.children.len(), "template sectionized");
                GenerationResult {
                    template_name,
                    status: GenerationStatus::Ok,
                    tree: Some(tree),
                    error: None,
                }
            }
            Err(err) => {
                error!(error = %err, "generation step failed");
                GenerationResult {
                    template_name,
                    status: GenerationStatus::Error,
                    tree: None,
                    error: Some(err),
                }
            }
        }
    }

    pub fn run_batch(&self, steps: &[GenerationStep]) -> Vec<GenerationResult> {
        let results: Vec<_> = steps.iter().map(|step| self.run_step(step)).collect();
        let failed = results.iter().filter(|r| !r.is_ok()).count();
        info!(steps = results.len(), failed, "batch finished");
        results
    }

    fn sectionize_step(&self, step: &GenerationStep) -> Result<SectionedTemplate, GenerateError> {
        let config = GenConfig::from_file(&step.config_path)?;
        let raw = RawTemplate::from_file(&step.template_path)?;
        sectionize_text(&config, &raw)
    }
}

/// Runs the text front end over `raw` using the template part of `config`.
pub fn preprocess_text(config: &GenConfig, raw: &RawTemplate) -> Result<PreprocessedTemplate, GenerateError> {
    TextPreprocessor::new(&config.template)?.preprocess(raw)
}

/// Preprocesses and sectionizes `raw` under the config's root section and bindings.
pub fn sectionize_text(config: &GenConfig, raw: &RawTemplate) -> Result<SectionedTemplate, GenerateError> {
    let preprocessed = preprocess_text(config, raw)?;
    Ok(sectionize(
        &preprocessed,
        &config.template.root_section,
        &config.binding,
    )?)
}
