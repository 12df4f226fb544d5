//! Front ends: turn a raw template into the ordered annotation stream the
//! sectionizer consumes.

use crate::diagnostics::GenerateError;
use crate::template::{PreprocessedTemplate, RawTemplate};

pub mod text;

pub use text::TextPreprocessor;

/// A format-specific scanner producing a preprocessed template.
///
/// Implementations must return annotations ordered by begin offset, with
/// offsets referring to the returned text.
pub trait Preprocessor {
    fn preprocess(&self, raw: &RawTemplate) -> Result<PreprocessedTemplate, GenerateError>;
}
