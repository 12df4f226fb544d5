//! Whitespace/repetition splitting
//!
//! Prefix and suffix literals must sit next to the repeated content, not
//! swallow a line's indentation or its line terminator. These helpers carve
//! that whitespace out into its own raw section and place the repetition
//! node on the content side of it:
//!
//! ```text
//! <whitespace><prefix><content>        (prefix)
//! <content><suffix><whitespace>        (suffix)
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::annotation::{RepetitionLiteral, RepetitionType};
use crate::section::{RawSection, RepetitionSection};

use super::escape::raw_section;

static LEADING_BLANKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A[ \t]+").unwrap_or_else(|e| panic!("invalid pattern: {e}")));

static TRAILING_WHITESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[ \t\n\x0B\x0C\r]+\z").unwrap_or_else(|e| panic!("invalid pattern: {e}"))
});

/// The nodes produced for a section's trailing content when a suffix is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixSplit {
    pub content: RawSection,
    pub repetition: RepetitionSection,
    pub trailing: Option<RawSection>,
}

/// Splits leading spaces and tabs off a section's content.
///
/// Returns the whitespace as a raw section (if any) and the prefix repetition
/// node, positioned right after the whitespace. The whitespace never runs past
/// `limit`.
pub fn split_prefix(
    prefix: &RepetitionLiteral,
    text: &str,
    section_start: usize,
    limit: usize,
) -> (Option<RawSection>, RepetitionSection) {
    let limit = limit.min(text.len()).max(section_start);
    match LEADING_BLANKS.find(&text[section_start..limit]) {
        Some(m) => {
            let whitespace_end = section_start + m.end();
            debug!(start = section_start, end = whitespace_end, "leading whitespace before prefix");
            (
                Some(raw_section(text, section_start, whitespace_end)),
                RepetitionSection::new(prefix, whitespace_end, RepetitionType::Prefix),
            )
        }
        None => (
            None,
            RepetitionSection::new(prefix, section_start, RepetitionType::Prefix),
        ),
    }
}

/// Splits trailing whitespace off `[content_start, section_end)`.
///
/// With trailing whitespace, the suffix node sits where the whitespace starts
/// and the whitespace becomes its own raw section. Without it, the suffix node
/// sits at `section_end`.
pub fn split_suffix(
    suffix: &RepetitionLiteral,
    text: &str,
    content_start: usize,
    section_end: usize,
) -> SuffixSplit {
    match TRAILING_WHITESPACE.find_at(&text[..section_end], content_start) {
        Some(m) => {
            debug!(start = m.start(), end = m.end(), "trailing whitespace after suffix");
            SuffixSplit {
                content: raw_section(text, content_start, m.start()),
                repetition: RepetitionSection::new(suffix, m.start(), RepetitionType::Suffix),
                trailing: Some(raw_section(text, m.start(), section_end)),
            }
        }
        None => SuffixSplit {
            content: raw_section(text, content_start, section_end),
            repetition: RepetitionSection::new(suffix, section_end, RepetitionType::Suffix),
            trailing: None,
        },
    }
}
