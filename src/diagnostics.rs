//! Sectionizer diagnostics
//!
//! All failures of the sectionizer, the configuration layer and the generator
//! are `miette` diagnostics. None of them are retried: a failed template is
//! reported whole, and the caller decides whether the batch continues.

use std::path::PathBuf;
use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::annotation::Span;

pub type SourceArc = Arc<NamedSource<String>>;

/// Failures of the section tree builder and its collaborators.
#[derive(Error, Diagnostic, Debug)]
#[diagnostic(url(docsrs))]
pub enum SectionizerError {
    #[error("the end of section '{name}' can't be found")]
    #[diagnostic(
        code(sectionizer::unterminated_section),
        help("check the section's end policy (end, literal_on_last_line or nr_of_lines)")
    )]
    UnterminatedSection {
        name: String,
        begin: usize,
        #[source_code]
        src: SourceArc,
        #[label("section '{name}' begins here")]
        span: SourceSpan,
    },

    #[error("unhandled annotation found: {name} at offset {offset}")]
    #[diagnostic(code(sectionizer::unhandled_annotation))]
    UnhandledAnnotation { name: String, offset: usize },

    #[error("there must be exactly one section model binding for root section '{root}', found {found}")]
    #[diagnostic(code(sectionizer::invalid_root_binding))]
    InvalidRootBinding { root: String, found: usize },

    #[error("annotation cursor pushed back without a preceding advance (position {position})")]
    #[diagnostic(code(sectionizer::cursor_misuse))]
    CursorMisuse { position: usize },

    #[error("annotation offset {offset} is outside the template text (length {length})")]
    #[diagnostic(
        code(sectionizer::annotation_out_of_range),
        help("the front end produced an offset past the end of the text or inside a multi-byte character")
    )]
    AnnotationOutOfRange { offset: usize, length: usize },
}

impl SectionizerError {
    /// Builds an `UnterminatedSection` labelled at the section's begin offset.
    pub fn unterminated(name: &str, begin: usize, template_name: &str, text: &str) -> Self {
        let src = Arc::new(NamedSource::new(template_name, text.to_string()));
        SectionizerError::UnterminatedSection {
            name: name.to_string(),
            begin,
            src,
            span: to_source_span(Span::at(begin)),
        }
    }
}

/// Failures while reading or interpreting configuration.
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{}'", path.display())]
    #[diagnostic(code(sectionizer::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config")]
    #[diagnostic(code(sectionizer::config::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON config")]
    #[diagnostic(code(sectionizer::config::json))]
    Json(#[from] serde_json::Error),

    #[error("unsupported config file extension for '{}'", path.display())]
    #[diagnostic(
        code(sectionizer::config::extension),
        help("use a .yaml, .yml or .json file")
    )]
    UnknownFormat { path: PathBuf },

    #[error("section '{name}' is declared more than once")]
    #[diagnostic(code(sectionizer::config::duplicate_section))]
    DuplicateSection { name: String },

    #[error("invalid literal_on_last_line for section '{name}'")]
    #[diagnostic(code(sectionizer::config::pattern))]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Failures of a single generation step.
#[derive(Error, Diagnostic, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sectionizer(#[from] SectionizerError),

    #[error("failed to read template '{}'", path.display())]
    #[diagnostic(code(sectionizer::template::io))]
    TemplateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid generation step '{spec}'")]
    #[diagnostic(
        code(sectionizer::step),
        help("steps are written TEMPLATE::CONFIG")
    )]
    InvalidStep { spec: String },
}

/// Converts a span into a miette `SourceSpan`, widening empty spans to one character.
pub fn to_source_span(span: Span) -> SourceSpan {
    let len = if span.end > span.start {
        span.end - span.start
    } else {
        1
    };
    SourceSpan::new(span.start.into(), len)
}

#[cfg(test)]
mod diagnostics_tests {
    use miette::Report;

    use super::*;

    #[test]
    fn unterminated_section_renders_label_and_help() {
        let err = SectionizerError::unterminated("Column", 4, "table.sql", "abc\ncol_a");
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("Column"));
        assert!(output.contains("begins here"));
        assert!(output.contains("nr_of_lines"));
    }

    #[test]
    fn generate_error_is_transparent_over_sectionizer_error() {
        let err: GenerateError = SectionizerError::InvalidRootBinding {
            root: "Document".to_string(),
            found: 0,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "there must be exactly one section model binding for root section 'Document', found 0"
        );
        assert_eq!(
            err.code().map(|c| c.to_string()).as_deref(),
            Some("sectionizer::invalid_root_binding")
        );
    }

    #[test]
    fn empty_spans_widen_to_one_character() {
        let span = to_source_span(Span::at(7));
        assert_eq!(span.offset(), 7);
        assert_eq!(span.len(), 1);
    }
}
