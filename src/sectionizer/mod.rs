//! Section tree builder
//!
//! Turns a flat, ordered annotation stream into a tree of named sections.
//! Section boundaries are not delimited pairs: each section's end is
//! discovered with its end policy, searched only in the raw gaps between
//! annotations. A nested section that closes before the annotation it just
//! read pushes that annotation back, so its parent picks up from there.
//!
//! All frames of the recursion share one [`AnnotationCursor`].

use std::sync::Arc;

use tracing::{debug, info};

use crate::annotation::{Annotation, SectionBounds, SectionDeclaration};
use crate::config::{BindingConfig, SectionBinding};
use crate::diagnostics::SectionizerError;
use crate::section::{CommentSection, NamedSection, SectionedTemplate, TemplateSection};
use crate::template::PreprocessedTemplate;

pub mod cursor;
pub mod escape;
pub mod repetition;
pub mod resolver;

pub use cursor::AnnotationCursor;

use escape::raw_section;
use repetition::{split_prefix, split_suffix};
use resolver::resolve;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Returns the single binding for the root section.
///
/// Zero or several matching bindings are rejected before any text is scanned.
pub fn root_binding<'c>(root_name: &str, bindings: &'c BindingConfig) -> Result<&'c SectionBinding, SectionizerError> {
    match bindings.bindings_for(root_name).as_slice() {
        [binding] => Ok(*binding),
        found => Err(SectionizerError::InvalidRootBinding {
            root: root_name.to_string(),
            found: found.len(),
        }),
    }
}

/// Builds the section tree of a preprocessed template.
///
/// The root must have exactly one binding; this is checked before the text is
/// scanned. The root section spans the whole text; its end is fixed up front
/// and never re-resolved. Fails when a nested section's end can never be found.
pub fn sectionize(
    template: &PreprocessedTemplate,
    root_name: &str,
    bindings: &BindingConfig,
) -> Result<SectionedTemplate, SectionizerError> {
    root_binding(root_name, bindings)?;
    check_offsets(&template.text, &template.annotations)?;

    let text = template.text.as_str();
    let declaration = Arc::new(SectionDeclaration::root(root_name));
    let mut bounds = SectionBounds {
        declaration: Arc::clone(&declaration),
        begin: 0,
        end: Some(text.len()),
    };
    let mut root = NamedSection::new(declaration, 0);
    root.span.end = text.len();

    let mut builder = TreeBuilder {
        template_name: &template.name,
        text,
        cursor: AnnotationCursor::new(&template.annotations),
    };
    builder.build(&mut bounds, &mut root, 0, true)?;

    Ok(SectionedTemplate::new(template.name.clone(), root))
}

// ============================================================================
// TREE BUILDER
// ============================================================================

struct TreeBuilder<'a> {
    template_name: &'a str,
    text: &'a str,
    cursor: AnnotationCursor<'a>,
}

impl<'a> TreeBuilder<'a> {
    /// Fills `node` with the content of the section described by `bounds`,
    /// starting at `search_start`, and returns the section's end offset.
    fn build(
        &mut self,
        bounds: &mut SectionBounds,
        node: &mut NamedSection,
        mut search_start: usize,
        is_root: bool,
    ) -> Result<usize, SectionizerError> {
        let length = self.text.len();
        debug!(
            section = %node.name,
            search_start,
            cursor = self.cursor.position(),
            remaining = self.cursor.remaining(),
            "processing named section"
        );

        if let Some(prefix) = bounds.declaration.prefix.as_ref() {
            let limit = self.peek_begin()?.min(bounds.end.unwrap_or(length));
            let (whitespace, repetition) = split_prefix(prefix, self.text, search_start, limit);
            if let Some(whitespace) = whitespace {
                search_start = whitespace.span.end;
                node.push(TemplateSection::Raw(whitespace));
            }
            debug!(section = %node.name, position = repetition.position, "prefix repetition");
            node.push(TemplateSection::Repetition(repetition));
        }

        while search_start < length {
            let next = self.cursor.next();
            let next_begin = next.map_or(length, Annotation::begin);

            if next_begin > search_start {
                let mut end = bounds.end;
                if end.is_none() {
                    debug!(
                        section = %node.name,
                        from = search_start,
                        to = next_begin,
                        "searching for section end"
                    );
                    end = resolve(&bounds.declaration.end, self.text, search_start, next_begin);
                    if let Some(found) = end {
                        bounds.end = Some(found);
                        node.span.end = found;
                        info!(section = %node.name, begin = node.span.start, end = found, "resolved section bounds");
                    }
                }

                match end {
                    Some(end) if end <= next_begin => {
                        if end > search_start {
                            self.close_section(&bounds.declaration, node, search_start, end);
                        }
                        if next.is_some() {
                            self.cursor.pushback()?;
                        }
                        return Ok(end);
                    }
                    _ => {
                        self.push_raw(node, search_start, next_begin);
                        search_start = next_begin;
                    }
                }
            }

            // The gap ran to the end of the text without closing this section.
            let Some(annotation) = next else {
                break;
            };

            let annotation_end = match annotation {
                Annotation::Comment(comment) => {
                    node.push(TemplateSection::Comment(CommentSection {
                        span: comment.span,
                        comment: comment.text.clone(),
                    }));
                    debug!(section = %node.name, span = %comment.span, "comment section");
                    comment.span.end
                }
                Annotation::SectionDeclaration(declaration) => declaration.span.end,
                Annotation::SectionBounds(child_bounds) => {
                    let mut child_bounds = child_bounds.clone();
                    let mut child = NamedSection::new(Arc::clone(&child_bounds.declaration), child_bounds.begin);
                    if let Some(end) = child_bounds.end {
                        child.span.end = end;
                    }
                    let child_end = self.build(&mut child_bounds, &mut child, search_start, false)?;
                    child.span.end = child_end;
                    info!(
                        parent = %node.name,
                        section = %child.name,
                        begin = child.span.start,
                        end = child_end,
                        "added named section"
                    );
                    node.push(TemplateSection::Named(child));
                    child_end
                }
                Annotation::Unrecognized { name, span } => {
                    return Err(SectionizerError::UnhandledAnnotation {
                        name: name.clone(),
                        offset: span.start,
                    })
                }
            };

            // Config-only declarations have no position in the text.
            if annotation.is_defined_in_template() {
                search_start = annotation_end;
            }
        }

        if is_root {
            return Ok(bounds.end.unwrap_or(length));
        }
        Err(SectionizerError::unterminated(
            &node.name,
            node.span.start,
            self.template_name,
            self.text,
        ))
    }

    /// Emits the last piece of a section's content, splitting out the suffix when configured.
    fn close_section(&self, declaration: &SectionDeclaration, node: &mut NamedSection, start: usize, end: usize) {
        match declaration.suffix.as_ref() {
            Some(suffix) => {
                let split = split_suffix(suffix, self.text, start, end);
                debug!(section = %node.name, position = split.repetition.position, "suffix repetition");
                node.push(TemplateSection::Raw(split.content));
                node.push(TemplateSection::Repetition(split.repetition));
                if let Some(trailing) = split.trailing {
                    node.push(TemplateSection::Raw(trailing));
                }
            }
            None => self.push_raw(node, start, end),
        }
    }

    fn push_raw(&self, node: &mut NamedSection, start: usize, end: usize) {
        debug!(section = %node.name, start, end, "raw section");
        node.push(TemplateSection::Raw(raw_section(self.text, start, end)));
    }

    /// Begin offset of the next annotation without consuming it.
    fn peek_begin(&mut self) -> Result<usize, SectionizerError> {
        match self.cursor.next() {
            Some(annotation) => {
                let begin = annotation.begin();
                self.cursor.pushback()?;
                Ok(begin)
            }
            None => Ok(self.text.len()),
        }
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn check_offsets(text: &str, annotations: &[Annotation]) -> Result<(), SectionizerError> {
    for annotation in annotations {
        let offsets = [Some(annotation.begin()), annotation.end()];
        for offset in offsets.into_iter().flatten() {
            if !text.is_char_boundary(offset) {
                return Err(SectionizerError::AnnotationOutOfRange {
                    offset,
                    length: text.len(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{
        CommentAnnotation, DeclarationAnnotation, EndPolicy, RepetitionAction, RepetitionLiteral,
        RepetitionStyle, RepetitionType, Span,
    };
    use crate::section::RawSection;

    fn bounds(declaration: &Arc<SectionDeclaration>, begin: usize) -> Annotation {
        Annotation::SectionBounds(SectionBounds::new(Arc::clone(declaration), begin))
    }

    fn line_section(name: &str) -> Arc<SectionDeclaration> {
        Arc::new(SectionDeclaration::new(name, false))
    }

    fn raw_spans(section: &NamedSection) -> Vec<(usize, usize)> {
        section
            .children
            .iter()
            .filter_map(|c| match c {
                TemplateSection::Raw(RawSection { span, .. }) => Some((span.start, span.end)),
                _ => None,
            })
            .collect()
    }

    fn root_bindings() -> BindingConfig {
        serde_yaml::from_str("sections:\n  - name: Root\n").unwrap()
    }

    fn build(text: &str, annotations: Vec<Annotation>) -> Result<SectionedTemplate, SectionizerError> {
        sectionize(&PreprocessedTemplate::new("test", text, annotations), "Root", &root_bindings())
    }

    #[test]
    fn template_without_annotations_is_one_raw_section() {
        let tree = build("abc", vec![]).unwrap();
        assert_eq!(tree.root.span, Span::new(0, 3));
        assert_eq!(raw_spans(&tree.root), vec![(0, 3)]);
    }

    #[test]
    fn sibling_line_sections_hand_annotations_back_to_the_parent() {
        let column = line_section("Column");
        let text = "head\ncol_a\ncol_b\ntail";
        let tree = build(text, vec![bounds(&column, 5), bounds(&column, 11)]).unwrap();

        let spans: Vec<Span> = tree.root.children.iter().map(TemplateSection::span).collect();
        assert_eq!(
            spans,
            vec![Span::new(0, 5), Span::new(5, 11), Span::new(11, 17), Span::new(17, 21)]
        );
        let columns = tree.root.find_all("Column");
        assert_eq!(columns.len(), 2);
        assert_eq!(raw_spans(columns[1]), vec![(11, 17)]);
        assert_eq!(tree.root.check_coverage(), Ok(()));
    }

    #[test]
    fn section_end_is_deferred_past_an_annotation() {
        let section = line_section("S");
        let comment = Annotation::Comment(CommentAnnotation {
            span: Span::at(3),
            text: "note".to_string(),
        });
        let tree = build("ab cd\nrest", vec![bounds(&section, 0), comment]).unwrap();

        let s = tree.root.find_all("S")[0];
        assert_eq!(s.span, Span::new(0, 6));
        assert_eq!(raw_spans(s), vec![(0, 3), (3, 6)]);
        assert!(matches!(&s.children[1], TemplateSection::Comment(c) if c.comment == "note"));
        assert_eq!(raw_spans(&tree.root), vec![(6, 10)]);
    }

    #[test]
    fn unterminated_section_fails() {
        let section = Arc::new(SectionDeclaration::new("S", true).with_end(EndPolicy::Marker {
            literal: "END".to_string(),
            include_end: true,
        }));
        let err = build("abc", vec![bounds(&section, 0)]).unwrap_err();
        assert!(matches!(
            err,
            SectionizerError::UnterminatedSection { ref name, begin: 0, .. } if name == "S"
        ));
    }

    #[test]
    fn unrecognized_annotation_is_unhandled() {
        let err = build(
            "abcdef",
            vec![Annotation::Unrecognized {
                name: "Placeholder".to_string(),
                span: Span::new(2, 4),
            }],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SectionizerError::UnhandledAnnotation { ref name, offset: 2 } if name == "Placeholder"
        ));
    }

    #[test]
    fn config_only_declaration_does_not_move_the_search_start() {
        let declaration = Annotation::SectionDeclaration(DeclarationAnnotation {
            declaration: line_section("Column"),
            span: Span::new(0, 4),
        });
        let tree = build("abcdef", vec![declaration]).unwrap();
        assert_eq!(raw_spans(&tree.root), vec![(0, 6)]);
    }

    #[test]
    fn prefix_and_suffix_surround_the_content() {
        let literal = |value: &str, style| RepetitionLiteral::new(value, style, RepetitionAction::Add);
        let column = Arc::new(
            SectionDeclaration::new("Column", false)
                .with_prefix(literal("<", RepetitionStyle::AllButFirst))
                .with_suffix(literal(",", RepetitionStyle::AllButLast)),
        );
        let text = "(\n  a int\n)";
        let tree = build(text, vec![bounds(&column, 2)]).unwrap();
        let col = tree.root.find_all("Column")[0];
        assert_eq!(col.span, Span::new(2, 10));

        let kinds: Vec<String> = col
            .children
            .iter()
            .map(|c| match c {
                TemplateSection::Raw(r) => format!("raw {:?}", r.content),
                TemplateSection::Repetition(r) => format!("{} @{}", r.repetition_type, r.position),
                other => format!("{other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["raw \"  \"", "prefix @4", "raw \"a int\"", "suffix @9", "raw \"\\n\""]
        );
        assert!(col.children.iter().any(|c| matches!(
            c,
            TemplateSection::Repetition(r) if r.repetition_type == RepetitionType::Prefix && r.content == "<"
        )));
        assert_eq!(tree.root.check_coverage(), Ok(()));
    }

    #[test]
    fn offsets_inside_a_character_are_rejected() {
        let err = build("é", vec![bounds(&line_section("S"), 1)]).unwrap_err();
        assert!(matches!(err, SectionizerError::AnnotationOutOfRange { offset: 1, length: 2 }));
    }

    #[test]
    fn root_binding_must_be_unique() {
        let bindings: BindingConfig = serde_yaml::from_str(
            "sections:\n  - name: Root\n  - name: Column\n  - name: Column\n",
        )
        .unwrap();
        assert_eq!(root_binding("Root", &bindings).unwrap().name, "Root");
        assert!(matches!(
            root_binding("Column", &bindings),
            Err(SectionizerError::InvalidRootBinding { found: 2, .. })
        ));
        assert!(matches!(
            root_binding("Missing", &bindings),
            Err(SectionizerError::InvalidRootBinding { found: 0, .. })
        ));
    }

    #[test]
    fn unbound_root_fails_before_the_text_is_scanned() {
        let template = PreprocessedTemplate::new("test", "é", vec![bounds(&line_section("S"), 1)]);
        let err = sectionize(&template, "Root", &BindingConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SectionizerError::InvalidRootBinding { ref root, found: 0 } if root == "Root"
        ));
    }
}
