//! Section tree produced by the sectionizer
//!
//! The tree is rooted at one synthetic named section spanning the whole
//! template text. Children are ordered, contiguous and never overlap; gaps
//! between named sections are explicit raw sections.

// ============================================================================
// IMPORTS
// ============================================================================

use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;

use crate::annotation::{
    RepetitionAction, RepetitionLiteral, RepetitionStyle, RepetitionType, SectionDeclaration, Span,
};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Verbatim template text, already escaped for the assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawSection {
    pub span: Span,
    pub content: String,
}

/// A template comment, kept for traceability. Emits nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentSection {
    pub span: Span,
    pub comment: String,
}

/// A literal re-emitted between repeated instances of the enclosing named section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepetitionSection {
    pub position: usize,
    pub repetition_type: RepetitionType,
    pub content: String,
    pub style: RepetitionStyle,
    pub action: RepetitionAction,
}

impl RepetitionSection {
    pub fn new(literal: &RepetitionLiteral, position: usize, repetition_type: RepetitionType) -> Self {
        Self {
            position,
            repetition_type,
            content: literal.value.clone(),
            style: literal.style,
            action: literal.action,
        }
    }
}

/// A bounded section with a name and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedSection {
    pub name: String,
    pub span: Span,
    #[serde(skip)]
    pub declaration: Arc<SectionDeclaration>,
    pub children: Vec<TemplateSection>,
}

/// A node of the section tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateSection {
    Raw(RawSection),
    Comment(CommentSection),
    Named(NamedSection),
    Repetition(RepetitionSection),
}

/// The finished tree for one template, handed whole to the assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionedTemplate {
    pub template_name: String,
    pub root: NamedSection,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl TemplateSection {
    /// The text range the node covers. Repetition nodes are zero-width.
    pub fn span(&self) -> Span {
        match self {
            TemplateSection::Raw(r) => r.span,
            TemplateSection::Comment(c) => c.span,
            TemplateSection::Named(n) => n.span,
            TemplateSection::Repetition(r) => Span::at(r.position),
        }
    }

    pub fn as_named(&self) -> Option<&NamedSection> {
        match self {
            TemplateSection::Named(n) => Some(n),
            _ => None,
        }
    }
}

impl NamedSection {
    /// A section whose end is not known yet; the builder fixes it once found.
    pub fn new(declaration: Arc<SectionDeclaration>, begin: usize) -> Self {
        Self {
            name: declaration.name.clone(),
            span: Span::at(begin),
            declaration,
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, section: TemplateSection) {
        self.children.push(section);
    }

    /// All named descendants called `name`, depth first.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a NamedSection> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a NamedSection>) {
        for child in &self.children {
            if let TemplateSection::Named(named) = child {
                if named.name == name {
                    found.push(named);
                }
                named.collect_named(name, found);
            }
        }
    }

    /// Checks the coverage law: every child lies within this section, children
    /// are contiguous from this section's begin to its end, recursively.
    /// Returns the first offending span on failure.
    pub fn check_coverage(&self) -> Result<(), Span> {
        let mut cursor = self.span.start;
        for child in &self.children {
            let span = child.span();
            if span.start != cursor || !self.span.contains(&span) {
                return Err(span);
            }
            cursor = span.end;
            if let TemplateSection::Named(named) = child {
                named.check_coverage()?;
            }
        }
        if cursor != self.span.end {
            return Err(Span::new(cursor, self.span.end));
        }
        Ok(())
    }
}

impl SectionedTemplate {
    pub fn new(template_name: impl Into<String>, root: NamedSection) -> Self {
        Self {
            template_name: template_name.into(),
            root,
        }
    }

    /// An indented, one-node-per-line rendering of the tree.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        write_named(&mut out, &self.root, 0);
        out
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn write_named(out: &mut String, section: &NamedSection, depth: usize) {
    let _ = writeln!(out, "{}{} [{}]", "  ".repeat(depth), section.name, section.span);
    for child in &section.children {
        let indent = "  ".repeat(depth + 1);
        match child {
            TemplateSection::Raw(raw) => {
                let _ = writeln!(out, "{indent}raw [{}] {:?}", raw.span, raw.content);
            }
            TemplateSection::Comment(comment) => {
                let _ = writeln!(out, "{indent}comment [{}] {:?}", comment.span, comment.comment);
            }
            TemplateSection::Repetition(rep) => {
                let _ = writeln!(
                    out,
                    "{indent}{} @{} {:?} ({:?}, {:?})",
                    rep.repetition_type, rep.position, rep.content, rep.style, rep.action
                );
            }
            TemplateSection::Named(named) => write_named(out, named, depth + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(start: usize, end: usize) -> TemplateSection {
        TemplateSection::Raw(RawSection {
            span: Span::new(start, end),
            content: String::new(),
        })
    }

    fn named(name: &str, start: usize, end: usize, children: Vec<TemplateSection>) -> NamedSection {
        let mut section = NamedSection::new(Arc::new(SectionDeclaration::new(name, true)), start);
        section.span.end = end;
        section.children = children;
        section
    }

    #[test]
    fn coverage_accepts_contiguous_children() {
        let inner = named("B", 3, 6, vec![raw(3, 6)]);
        let root = named("A", 0, 10, vec![raw(0, 3), TemplateSection::Named(inner), raw(6, 10)]);
        assert_eq!(root.check_coverage(), Ok(()));
    }

    #[test]
    fn coverage_reports_gaps_and_overlaps() {
        let gap = named("A", 0, 10, vec![raw(0, 3), raw(4, 10)]);
        assert_eq!(gap.check_coverage(), Err(Span::new(4, 10)));

        let short = named("A", 0, 10, vec![raw(0, 3)]);
        assert_eq!(short.check_coverage(), Err(Span::new(3, 10)));
    }

    #[test]
    fn outline_nests_named_sections() {
        let inner = named("Column", 2, 4, vec![raw(2, 4)]);
        let root = named("Table", 0, 4, vec![raw(0, 2), TemplateSection::Named(inner)]);
        let outline = SectionedTemplate::new("t", root).outline();
        let lines: Vec<&str> = outline.lines().collect();
        assert_eq!(lines[0], "Table [0:4]");
        assert_eq!(lines[2], "  Column [2:4]");
        assert_eq!(lines[3], "    raw [2:4] \"\"");
    }
}
