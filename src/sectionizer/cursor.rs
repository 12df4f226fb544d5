//! Forward cursor over the annotation stream with one step of pushback.

use crate::annotation::Annotation;
use crate::diagnostics::SectionizerError;

/// Sequential reader over an ordered annotation stream.
///
/// A nested section that closes before the annotation it just read hands that
/// annotation back to its parent with [`AnnotationCursor::pushback`].
#[derive(Debug)]
pub struct AnnotationCursor<'a> {
    annotations: &'a [Annotation],
    position: usize,
    can_push_back: bool,
}

impl<'a> AnnotationCursor<'a> {
    pub fn new(annotations: &'a [Annotation]) -> Self {
        Self {
            annotations,
            position: 0,
            can_push_back: false,
        }
    }

    /// Advances and returns the next annotation, or `None` at the end.
    pub fn next(&mut self) -> Option<&'a Annotation> {
        let annotation = self.annotations.get(self.position);
        self.can_push_back = annotation.is_some();
        if annotation.is_some() {
            self.position += 1;
        }
        annotation
    }

    /// Steps back over the annotation returned by the last `next()`.
    ///
    /// Only valid once, directly after a `next()` that returned an annotation.
    pub fn pushback(&mut self) -> Result<(), SectionizerError> {
        if !self.can_push_back {
            return Err(SectionizerError::CursorMisuse {
                position: self.position,
            });
        }
        self.can_push_back = false;
        self.position -= 1;
        Ok(())
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.annotations.len() - self.position
    }
}
