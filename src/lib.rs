//! Sectionizer: turns an annotated template into a tree of named sections.
//!
//! A front end scans a raw template into text plus an ordered annotation
//! stream; [`sectionize`] folds that stream into a [`SectionedTemplate`]
//! whose leaves cover the text exactly.

pub use crate::annotation::{Annotation, EndPolicy, RepetitionAction, RepetitionStyle, SectionDeclaration, Span};
pub use crate::config::GenConfig;
pub use crate::diagnostics::{ConfigError, GenerateError, SectionizerError};
pub use crate::frontend::{Preprocessor, TextPreprocessor};
pub use crate::generator::{GenerationResult, GenerationStatus, GenerationStep, Generator};
pub use crate::section::{NamedSection, SectionedTemplate, TemplateSection};
pub use crate::sectionizer::{root_binding, sectionize};
pub use crate::template::{PreprocessedTemplate, RawTemplate};

pub mod annotation;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod frontend;
pub mod generator;
pub mod logging;
pub mod section;
pub mod sectionizer;
pub mod template;
