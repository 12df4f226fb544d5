//! Plain-text front end
//!
//! Recognises whole-line annotations of the form
//!
//! ```text
//! <prefix>Section(name="Column" nrOfLines="1" suffix=",")
//! <prefix>Comment("free text")
//! ```
//!
//! and removes those lines from the text. A section annotation opens its
//! section on the following line. Config-declared sections open at every
//! occurrence of their `begin` literal.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::annotation::{Annotation, CommentAnnotation, DeclarationAnnotation, SectionBounds, Span};
use crate::config::{SectionConfig, TemplateConfig};
use crate::diagnostics::{ConfigError, GenerateError};
use crate::template::{PreprocessedTemplate, RawTemplate};

use super::Preprocessor;

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\w+)\s*=\s*"((?:[^"\\]|\\.)*)""#).unwrap_or_else(|e| panic!("invalid pattern: {e}"))
});

/// Front end for free-text templates.
#[derive(Debug, Clone)]
pub struct TextPreprocessor {
    sections: Vec<SectionConfig>,
    annotation_line: Regex,
}

impl TextPreprocessor {
    pub fn new(config: &TemplateConfig) -> Result<Self, ConfigError> {
        let pattern = format!(
            r"^[ \t]*{}(Section|Comment)\((.*)\)[ \t]*\r?\n?$",
            regex::escape(&config.annotation_prefix)
        );
        let annotation_line = Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern {
            name: "annotation_prefix".to_string(),
            source,
        })?;
        Ok(Self {
            sections: config.sections.clone(),
            annotation_line,
        })
    }

    fn section_annotations(&self, body: &str, offset: usize) -> Result<Vec<Annotation>, GenerateError> {
        let attributes = parse_attributes(body);
        let Some((_, name)) = attributes.iter().find(|(key, _)| key == "name") else {
            return Ok(vec![unrecognized("Section", offset)]);
        };

        let mut section = SectionConfig::named(name.as_str());
        for (key, value) in &attributes {
            let value = value.clone();
            match key.as_str() {
                "name" => {}
                "end" => section.end = Some(value),
                "includeEnd" => section.include_end = value == "true",
                "literalOnLastLine" => section.literal_on_last_line = Some(value),
                "nrOfLines" => match value.parse() {
                    Ok(lines) => section.nr_of_lines = Some(lines),
                    Err(_) => return Ok(vec![unrecognized("Section(nrOfLines)", offset)]),
                },
                "prefix" => section.prefix = Some(value),
                "suffix" => section.suffix = Some(value),
                "prefixStyle" | "suffixStyle" => match value.parse() {
                    Ok(style) if key == "prefixStyle" => section.prefix_style = Some(style),
                    Ok(style) => section.suffix_style = Some(style),
                    Err(_) => return Ok(vec![unrecognized(&format!("Section({key})"), offset)]),
                },
                "prefixAction" | "suffixAction" => match value.parse() {
                    Ok(action) if key == "prefixAction" => section.prefix_action = Some(action),
                    Ok(action) => section.suffix_action = Some(action),
                    Err(_) => return Ok(vec![unrecognized(&format!("Section({key})"), offset)]),
                },
                other => warn!(section = %name, attribute = other, "ignoring unknown section attribute"),
            }
        }

        let declaration = Arc::new(section.declaration(true)?);
        Ok(vec![
            Annotation::SectionDeclaration(DeclarationAnnotation {
                declaration: Arc::clone(&declaration),
                span: Span::at(offset),
            }),
            Annotation::SectionBounds(SectionBounds::new(declaration, offset)),
        ])
    }
}

impl Preprocessor for TextPreprocessor {
    fn preprocess(&self, raw: &RawTemplate) -> Result<PreprocessedTemplate, GenerateError> {
        let mut text = String::with_capacity(raw.text.len());
        let mut declared = Vec::new();
        let mut annotations = Vec::new();

        for section in &self.sections {
            declared.push(Arc::new(section.declaration(false)?));
        }
        for declaration in &declared {
            annotations.push(Annotation::SectionDeclaration(DeclarationAnnotation {
                declaration: Arc::clone(declaration),
                span: Span::at(0),
            }));
        }

        for line in raw.text.split_inclusive('\n') {
            let Some(captures) = self.annotation_line.captures(line) else {
                text.push_str(line);
                continue;
            };
            let offset = text.len();
            let body = captures.get(2).map_or("", |m| m.as_str());
            if &captures[1] == "Section" {
                annotations.extend(self.section_annotations(body, offset)?);
            } else {
                annotations.push(Annotation::Comment(CommentAnnotation {
                    span: Span::at(offset),
                    text: comment_text(body),
                }));
            }
        }

        for (section, declaration) in self.sections.iter().zip(&declared) {
            let Some(begin) = section.begin_literal() else {
                continue;
            };
            for (index, _) in text.match_indices(begin) {
                let offset = if section.include_begin {
                    index
                } else {
                    index + begin.len()
                };
                if offset >= text.len() {
                    warn!(section = %section.name, offset, "begin literal ends the text; no section opened");
                    continue;
                }
                annotations.push(Annotation::SectionBounds(SectionBounds::new(
                    Arc::clone(declaration),
                    offset,
                )));
            }
        }

        annotations.sort_by_key(Annotation::begin);
        debug!(
            template = %raw.name,
            annotations = annotations.len(),
            stripped = raw.text.len() - text.len(),
            "preprocessed text template"
        );
        Ok(PreprocessedTemplate::new(raw.name.clone(), text, annotations))
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn parse_attributes(body: &str) -> Vec<(String, String)> {
    ATTRIBUTE
        .captures_iter(body)
        .map(|c| (c[1].to_string(), unescape(&c[2])))
        .collect()
}

fn comment_text(body: &str) -> String {
    let body = body.trim();
    match body.strip_prefix('"').and_then(|b| b.strip_suffix('"')) {
        Some(quoted) => unescape(quoted),
        None => body.to_string(),
    }
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn unrecognized(name: &str, offset: usize) -> Annotation {
    Annotation::Unrecognized {
        name: name.to_string(),
        span: Span::at(offset),
    }
}
