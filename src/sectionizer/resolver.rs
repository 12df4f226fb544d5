//! Section-end resolution
//!
//! Finds where a section ends inside a search window of the template text.
//! `None` means the end is not inside the window: it may lie past the next
//! annotation, so the caller defers instead of failing.

use crate::annotation::EndPolicy;

/// Computes the end offset of a section whose content is searched from
/// `window_start`. Results past `window_end` are reported as `None`.
pub fn resolve(policy: &EndPolicy, text: &str, window_start: usize, window_end: usize) -> Option<usize> {
    if window_start > text.len() {
        return None;
    }
    let end = match policy {
        EndPolicy::Marker {
            literal,
            include_end,
        } => {
            let found = window_start + text[window_start..].find(literal.as_str())?;
            if *include_end {
                found + literal.len()
            } else {
                found
            }
        }
        EndPolicy::LiteralOnLastLine(last_line) => last_line.pattern().find_at(text, window_start)?.end(),
        // A zero line count never closes the section.
        EndPolicy::LineCount(0) => return None,
        EndPolicy::LineCount(lines) => {
            let mut end = window_start;
            for _ in 0..*lines {
                end += text[end..].find('\n')? + 1;
            }
            end
        }
    };
    (end <= window_end).then_some(end)
}
