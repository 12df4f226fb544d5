//! Annotation model for the sectionizer
//!
//! Annotations are the markers a front end recognises in (or configures for) a
//! template. The stream handed to the sectionizer is ordered by begin offset.
//! Offsets are byte positions into the preprocessed template text.

// ============================================================================
// IMPORTS
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPANS
// ============================================================================

/// Represents a half-open `[start, end)` range in the template text.
///
/// # Examples
///
/// ```rust
/// use sectionizer::annotation::Span;
/// let span = Span::new(0, 5);
/// assert_eq!(span.len(), 5);
/// assert!(span.contains(&Span::at(3)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A zero-width span at `offset`.
    pub fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when `other` lies within this span (zero-width spans on the edges included).
    pub fn contains(&self, other: &Span) -> bool {
        other.start >= self.start && other.end <= self.end && other.start <= other.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

// ============================================================================
// REPETITION SETTINGS
// ============================================================================

/// Whether a repetition literal goes before or after a repeated section instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepetitionType {
    Prefix,
    Suffix,
}

impl fmt::Display for RepetitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepetitionType::Prefix => write!(f, "prefix"),
            RepetitionType::Suffix => write!(f, "suffix"),
        }
    }
}

/// Which repeated instances a repetition literal applies to.
///
/// The sectionizer never interprets this value; it is carried from the
/// configuration to the assembler unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepetitionStyle {
    All,
    AllButFirst,
    AllButLast,
    FirstOnly,
    LastOnly,
}

/// What the assembler does with the literal at the selected instances.
/// Opaque to the sectionizer, like [`RepetitionStyle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum RepetitionAction {
    #[default]
    Add,
    Remove,
}

impl FromStr for RepetitionStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(RepetitionStyle::All),
            "allButFirst" => Ok(RepetitionStyle::AllButFirst),
            "allButLast" => Ok(RepetitionStyle::AllButLast),
            "firstOnly" => Ok(RepetitionStyle::FirstOnly),
            "lastOnly" => Ok(RepetitionStyle::LastOnly),
            other => Err(format!("unknown repetition style '{other}'")),
        }
    }
}

impl FromStr for RepetitionAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(RepetitionAction::Add),
            "remove" => Ok(RepetitionAction::Remove),
            other => Err(format!("unknown repetition action '{other}'")),
        }
    }
}

/// A configured prefix or suffix literal together with its style and action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepetitionLiteral {
    pub value: String,
    pub style: RepetitionStyle,
    pub action: RepetitionAction,
}

impl RepetitionLiteral {
    /// Builds a literal, treating an empty value as "not configured".
    pub fn new(value: impl Into<String>, style: RepetitionStyle, action: RepetitionAction) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            return None;
        }
        Some(Self {
            value,
            style,
            action,
        })
    }
}

// ============================================================================
// END-DETECTION POLICY
// ============================================================================

/// A literal whose line marks the end of a section, with its compiled
/// `literal .* \r? \n?` search pattern.
#[derive(Clone)]
pub struct LastLineLiteral {
    literal: String,
    pattern: Regex,
}

impl LastLineLiteral {
    pub fn new(literal: impl Into<String>) -> Result<Self, regex::Error> {
        let literal = literal.into();
        let pattern = Regex::new(&format!(r"{}.*\r?\n?", regex::escape(&literal)))?;
        Ok(Self { literal, pattern })
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl fmt::Debug for LastLineLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LastLineLiteral").field(&self.literal).finish()
    }
}

impl PartialEq for LastLineLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.literal == other.literal
    }
}

impl Eq for LastLineLiteral {}

/// How the end of a section is found. Exactly one policy applies per section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndPolicy {
    /// Search for `literal`; when `include_end` is set the marker belongs to the section.
    Marker { literal: String, include_end: bool },
    /// The section ends after the line holding the literal.
    LiteralOnLastLine(LastLineLiteral),
    /// The section ends after the Nth `\n`.
    LineCount(usize),
}

impl Default for EndPolicy {
    fn default() -> Self {
        EndPolicy::LineCount(1)
    }
}

impl fmt::Display for EndPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndPolicy::Marker {
                literal,
                include_end,
            } => write!(f, "end={literal:?} include_end={include_end}"),
            EndPolicy::LiteralOnLastLine(l) => write!(f, "literal_on_last_line={:?}", l.literal()),
            EndPolicy::LineCount(n) => write!(f, "nr_of_lines={n}"),
        }
    }
}

// ============================================================================
// SECTION DECLARATIONS
// ============================================================================

/// The definition of a section, whether written in the template or declared
/// in configuration only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDeclaration {
    pub name: String,
    pub end: EndPolicy,
    pub prefix: Option<RepetitionLiteral>,
    pub suffix: Option<RepetitionLiteral>,
    /// False for sections that exist only in configuration.
    pub defined_in_template: bool,
}

impl SectionDeclaration {
    /// A declaration with the default end policy (one line) and no repetition literals.
    pub fn new(name: impl Into<String>, defined_in_template: bool) -> Self {
        Self {
            name: name.into(),
            end: EndPolicy::default(),
            prefix: None,
            suffix: None,
            defined_in_template,
        }
    }

    /// The implicit declaration of a root section.
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    pub fn with_end(mut self, end: EndPolicy) -> Self {
        self.end = end;
        self
    }

    pub fn with_prefix(mut self, prefix: Option<RepetitionLiteral>) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn with_suffix(mut self, suffix: Option<RepetitionLiteral>) -> Self {
        self.suffix = suffix;
        self
    }
}

// ============================================================================
// ANNOTATIONS
// ============================================================================

/// A comment found in the template. Never has children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentAnnotation {
    pub span: Span,
    pub text: String,
}

/// A bare section declaration in the stream. It has no text footprint of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationAnnotation {
    pub declaration: Arc<SectionDeclaration>,
    pub span: Span,
}

/// A declaration paired with a begin offset and a possibly unresolved end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBounds {
    pub declaration: Arc<SectionDeclaration>,
    pub begin: usize,
    pub end: Option<usize>,
}

impl SectionBounds {
    pub fn new(declaration: Arc<SectionDeclaration>, begin: usize) -> Self {
        Self {
            declaration,
            begin,
            end: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name
    }
}

/// An entry of the annotation stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Comment(CommentAnnotation),
    SectionDeclaration(DeclarationAnnotation),
    SectionBounds(SectionBounds),
    /// A marker a front end recognised but could not classify.
    Unrecognized { name: String, span: Span },
}

impl Annotation {
    pub fn begin(&self) -> usize {
        match self {
            Annotation::Comment(c) => c.span.start,
            Annotation::SectionDeclaration(d) => d.span.start,
            Annotation::SectionBounds(b) => b.begin,
            Annotation::Unrecognized { span, .. } => span.start,
        }
    }

    /// The end offset, when known. Unresolved section bounds have none yet.
    pub fn end(&self) -> Option<usize> {
        match self {
            Annotation::Comment(c) => Some(c.span.end),
            Annotation::SectionDeclaration(d) => Some(d.span.end),
            Annotation::SectionBounds(b) => b.end,
            Annotation::Unrecognized { span, .. } => Some(span.end),
        }
    }

    /// Whether the annotation is physically present in the template.
    pub fn is_defined_in_template(&self) -> bool {
        match self {
            Annotation::SectionDeclaration(d) => d.declaration.defined_in_template,
            _ => true,
        }
    }

    pub fn kind_name(&self) -> &str {
        match self {
            Annotation::Comment(_) => "Comment",
            Annotation::SectionDeclaration(_) => "SectionDeclaration",
            Annotation::SectionBounds(_) => "SectionBounds",
            Annotation::Unrecognized { name, .. } => name,
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Comment(c) => write!(f, "Comment({}) {:?}", c.span, c.text),
            Annotation::SectionDeclaration(d) => write!(
                f,
                "SectionDeclaration({}) {} [{}]{}",
                d.span,
                d.declaration.name,
                d.declaration.end,
                if d.declaration.defined_in_template {
                    ""
                } else {
                    " config"
                }
            ),
            Annotation::SectionBounds(b) => match b.end {
                Some(end) => write!(f, "SectionBounds({}:{}) {}", b.begin, end, b.name()),
                None => write!(f, "SectionBounds({}:?) {}", b.begin, b.name()),
            },
            Annotation::Unrecognized { name, span } => write!(f, "Unrecognized({span}) {name}"),
        }
    }
}
