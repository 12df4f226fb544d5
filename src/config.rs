//! Generator configuration
//!
//! A configuration pairs a template config (root section name, annotation
//! prefix, config-declared sections) with a binding config (which model
//! nodes feed which sections). It is read from YAML or JSON.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::annotation::{
    EndPolicy, LastLineLiteral, RepetitionAction, RepetitionLiteral, RepetitionStyle, SectionDeclaration,
};
use crate::diagnostics::ConfigError;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// The complete configuration for one template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenConfig {
    pub template: TemplateConfig,
    #[serde(default)]
    pub binding: BindingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub root_section: String,
    #[serde(default = "default_annotation_prefix")]
    pub annotation_prefix: String,
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

/// A section definition, either from the config file or from an in-template annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub name: String,
    /// Every occurrence of this literal opens a config-declared section.
    #[serde(default)]
    pub begin: Option<String>,
    #[serde(default = "default_true")]
    pub include_begin: bool,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub include_end: bool,
    #[serde(default)]
    pub literal_on_last_line: Option<String>,
    #[serde(default)]
    pub nr_of_lines: Option<usize>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub prefix_style: Option<RepetitionStyle>,
    #[serde(default)]
    pub prefix_action: Option<RepetitionAction>,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub suffix_style: Option<RepetitionStyle>,
    #[serde(default)]
    pub suffix_action: Option<RepetitionAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    #[serde(default)]
    pub sections: Vec<SectionBinding>,
}

/// Binds a section to a location in the model. The path is opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionBinding {
    pub name: String,
    #[serde(default)]
    pub model_path: Option<String>,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl GenConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: GenConfig = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: GenConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file, choosing the format from its extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading config");
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&source),
            Some("json") => Self::from_json_str(&source),
            _ => Err(ConfigError::UnknownFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Rejects duplicate section names and invalid end patterns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for section in &self.template.sections {
            if !seen.insert(section.name.as_str()) {
                return Err(ConfigError::DuplicateSection {
                    name: section.name.clone(),
                });
            }
            section.end_policy()?;
        }
        Ok(())
    }
}

impl SectionConfig {
    /// A section with only a name; every other setting takes its default.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            begin: None,
            include_begin: true,
            end: None,
            include_end: false,
            literal_on_last_line: None,
            nr_of_lines: None,
            prefix: None,
            prefix_style: None,
            prefix_action: None,
            suffix: None,
            suffix_style: None,
            suffix_action: None,
        }
    }

    /// The end policy, by priority: explicit end, literal on last line, line count.
    pub fn end_policy(&self) -> Result<EndPolicy, ConfigError> {
        if let Some(end) = non_empty(&self.end) {
            return Ok(EndPolicy::Marker {
                literal: end.to_string(),
                include_end: self.include_end,
            });
        }
        if let Some(literal) = non_empty(&self.literal_on_last_line) {
            let literal = LastLineLiteral::new(literal).map_err(|source| ConfigError::InvalidPattern {
                name: self.name.clone(),
                source,
            })?;
            return Ok(EndPolicy::LiteralOnLastLine(literal));
        }
        Ok(EndPolicy::LineCount(self.nr_of_lines.unwrap_or(1)))
    }

    pub fn declaration(&self, defined_in_template: bool) -> Result<SectionDeclaration, ConfigError> {
        let prefix = non_empty(&self.prefix).and_then(|value| {
            RepetitionLiteral::new(
                value,
                self.prefix_style.unwrap_or(RepetitionStyle::AllButFirst),
                self.prefix_action.unwrap_or_default(),
            )
        });
        let suffix = non_empty(&self.suffix).and_then(|value| {
            RepetitionLiteral::new(
                value,
                self.suffix_style.unwrap_or(RepetitionStyle::AllButLast),
                self.suffix_action.unwrap_or_default(),
            )
        });
        Ok(SectionDeclaration::new(self.name.clone(), defined_in_template)
            .with_end(self.end_policy()?)
            .with_prefix(prefix)
            .with_suffix(suffix))
    }

    /// The begin literal, if this section is opened by one.
    pub fn begin_literal(&self) -> Option<&str> {
        non_empty(&self.begin)
    }
}

impl BindingConfig {
    pub fn bindings_for(&self, name: &str) -> Vec<&SectionBinding> {
        self.sections.iter().filter(|b| b.name == name).collect()
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn default_annotation_prefix() -> String {
    "@".to_string()
}

fn default_true() -> bool {
    true
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
