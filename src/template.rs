//! Template inputs: the raw template as read from disk and the front end's
//! preprocessed form.

use std::fs;
use std::path::Path;

use crate::annotation::Annotation;
use crate::diagnostics::GenerateError;

/// An immutable template body plus the name used in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTemplate {
    pub name: String,
    pub text: String,
}

impl RawTemplate {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Reads a template file, naming it after its path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GenerateError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GenerateError::TemplateIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.display().to_string(), text))
    }
}

/// The text a front end hands to the sectionizer together with its
/// annotations, ordered by begin offset.
///
/// Front ends may strip annotation markup, so `text` is not necessarily the
/// raw template's text; all annotation offsets refer to `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessedTemplate {
    pub name: String,
    pub text: String,
    pub annotations: Vec<Annotation>,
}

impl PreprocessedTemplate {
    pub fn new(name: impl Into<String>, text: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            annotations,
        }
    }
}
