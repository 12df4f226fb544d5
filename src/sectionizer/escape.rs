//! Escaping applied to raw template slices as they become raw sections.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::annotation::Span;
use crate::section::RawSection;

static NAMED_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&([a-zA-Z0-9]+;)").unwrap_or_else(|e| panic!("invalid entity pattern: {e}"))
});

/// Doubles literal entity references: `&name;` becomes `&amp;name;`.
pub fn double_entity_encode(input: &str) -> Cow<'_, str> {
    NAMED_ENTITY.replace_all(input, "&amp;$1")
}

/// Escapes the characters that are significant in XML text content.
pub fn escape_xml_text(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>']) {
        return Cow::Borrowed(input);
    }
    let mut escaped = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Entity doubling followed by XML text escaping, applied once per raw slice.
pub fn escape_raw(input: &str) -> String {
    escape_xml_text(&double_entity_encode(input)).into_owned()
}

/// Cuts `[start, end)` out of `text` as an escaped raw section.
pub fn raw_section(text: &str, start: usize, end: usize) -> RawSection {
    RawSection {
        span: Span::new(start, end),
        content: escape_raw(&text[start..end]),
    }
}
