// Tree-level laws of the sectionizer, checked through the public API.

use std::sync::Arc;

use sectionizer::annotation::{
    CommentAnnotation, DeclarationAnnotation, LastLineLiteral, RepetitionAction, RepetitionLiteral,
    RepetitionStyle, SectionBounds,
};
use sectionizer::generator::sectionize_text;
use sectionizer::sectionizer::repetition::split_suffix;
use sectionizer::sectionizer::resolver::resolve;
use sectionizer::{
    sectionize, Annotation, EndPolicy, GenConfig, GenerateError, NamedSection, PreprocessedTemplate, RawTemplate,
    SectionDeclaration, SectionedTemplate, SectionizerError, Span, TemplateSection,
};

const TABLE_CONFIG: &str = "template:\n  root_section: Table\nbinding:\n  sections:\n    - name: Table\n";
const TABLE: &str = "create table t (\n  @Section(name=\"Column\" suffix=\",\")\n  a int\n  @Section(name=\"Column\" suffix=\",\")\n  b text\n);\n";

const LIST_CONFIG: &str =
    "template:\n  root_section: Doc\n  sections:\n    - name: Item\n      begin: \"- \"\nbinding:\n  sections:\n    - name: Doc\n";
const LIST: &str = "list:\n- one\n- two\nend\n";

const CLASS_CONFIG: &str = "template:\n  root_section: Class\nbinding:\n  sections:\n    - name: Class\n";
const CLASS: &str = "class A {\n@Section(name=\"Method\" end=\"}\" includeEnd=\"true\")\n  void f() {\n  @Comment(\"body\")\n    x();\n  }\n}\n";

const DOC_CONFIG: &str = "template:\n  root_section: Doc\nbinding:\n  sections:\n    - name: Doc\n";

const NESTED: &str = "head\n@Section(name=\"Block\" end=\"}\" includeEnd=\"true\")\n{\n@Section(name=\"Line\" prefix=\",\")\n  x\n  y\n}\ntail\n";

fn fixture(config: &str, template: &str) -> Result<SectionedTemplate, GenerateError> {
    sectionizer::logging::init_for_tests();
    let config = GenConfig::from_yaml_str(config)?;
    sectionize_text(&config, &RawTemplate::new("fixture", template))
}

fn fixtures() -> Vec<(&'static str, &'static str)> {
    vec![
        (TABLE_CONFIG, TABLE),
        (LIST_CONFIG, LIST),
        (CLASS_CONFIG, CLASS),
        (DOC_CONFIG, NESTED),
    ]
}

fn stripped_len(template: &str) -> usize {
    template
        .split_inclusive('\n')
        .filter(|line| !line.trim_start().starts_with('@'))
        .map(str::len)
        .sum()
}

fn leaf_kinds(section: &NamedSection) -> Vec<String> {
    section
        .children
        .iter()
        .map(|child| match child {
            TemplateSection::Raw(raw) => format!("raw {:?}", raw.content),
            TemplateSection::Comment(comment) => format!("comment {:?}", comment.comment),
            TemplateSection::Named(named) => format!("{} {}", named.name, named.span),
            TemplateSection::Repetition(rep) => format!("{} @{}", rep.repetition_type, rep.position),
        })
        .collect()
}

#[test]
fn every_tree_covers_its_text_exactly() {
    for (config, template) in fixtures() {
        let tree = fixture(config, template).unwrap();
        assert_eq!(tree.root.check_coverage(), Ok(()), "{}", tree.outline());
    }
}

#[test]
fn building_twice_yields_the_same_tree() {
    for (config, template) in fixtures() {
        assert_eq!(fixture(config, template).unwrap(), fixture(config, template).unwrap());
    }
}

#[test]
fn root_always_ends_at_text_length() {
    for (config, template) in fixtures() {
        let tree = fixture(config, template).unwrap();
        assert_eq!(tree.root.span, Span::new(0, stripped_len(template)));
    }
}

#[test]
fn repeated_columns_get_their_suffix_before_the_newline() {
    let tree = fixture(TABLE_CONFIG, TABLE).unwrap();
    let columns = tree.root.find_all("Column");
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].span, Span::new(17, 25));
    assert_eq!(leaf_kinds(columns[0]), vec!["raw \"  a int\"", "suffix @24", "raw \"\\n\""]);
    assert_eq!(columns[1].span, Span::new(25, 34));
    assert_eq!(leaf_kinds(columns[1]), vec!["raw \"  b text\"", "suffix @33", "raw \"\\n\""]);
    assert_eq!(
        leaf_kinds(&tree.root),
        vec![
            "raw \"create table t (\\n\"",
            "Column 17:25",
            "Column 25:34",
            "raw \");\\n\""
        ]
    );
}

#[test]
fn config_sections_open_at_their_begin_literal() {
    let tree = fixture(LIST_CONFIG, LIST).unwrap();
    let items: Vec<Span> = tree.root.find_all("Item").iter().map(|item| item.span).collect();
    assert_eq!(items, vec![Span::new(6, 12), Span::new(12, 18)]);
}

#[test]
fn comment_stays_inside_the_enclosing_section() {
    let tree = fixture(CLASS_CONFIG, CLASS).unwrap();
    let method = tree.root.find_all("Method")[0];
    assert_eq!(method.span, Span::new(10, 35));
    assert_eq!(
        leaf_kinds(method),
        vec![
            "raw \"  void f() {\\n\"",
            "comment \"body\"",
            "raw \"    x();\\n  }\""
        ]
    );
}

#[test]
fn parent_end_is_resolved_after_its_nested_child_closes() {
    let tree = fixture(DOC_CONFIG, NESTED).unwrap();
    assert_eq!(
        leaf_kinds(&tree.root),
        vec!["raw \"head\\n\"", "Block 5:16", "raw \"\\ntail\\n\""]
    );

    let block = tree.root.find_all("Block")[0];
    assert_eq!(leaf_kinds(block), vec!["raw \"{\\n\"", "Line 7:11", "raw \"  y\\n}\""]);

    let line = block.find_all("Line")[0];
    assert_eq!(leaf_kinds(line), vec!["raw \"  \"", "prefix @9", "raw \"x\\n\""]);
    assert_eq!(tree.root.check_coverage(), Ok(()));
}

#[test]
fn end_policies_resolve_the_documented_examples() {
    assert_eq!(resolve(&EndPolicy::LineCount(1), "abc\ndef", 0, 7), Some(4));

    let marker = EndPolicy::Marker {
        literal: "END".to_string(),
        include_end: true,
    };
    assert_eq!(resolve(&marker, "hello ENDworld", 0, 14), Some(9));

    let last_line = EndPolicy::LiteralOnLastLine(LastLineLiteral::new("STOP").unwrap());
    assert_eq!(resolve(&last_line, "xxSTOP more\nrest", 0, 17), Some(12));
}

#[test]
fn suffix_split_keeps_trailing_whitespace_outside() {
    let suffix = RepetitionLiteral::new(",", RepetitionStyle::AllButLast, RepetitionAction::Add).unwrap();
    let text = "value;   \n";
    let split = split_suffix(&suffix, text, 0, text.len());
    assert_eq!(split.content.content, "value;");
    assert_eq!(split.repetition.position, 6);
    assert_eq!(split.trailing.unwrap().content, "   \n");
}

#[test]
fn config_only_declaration_yields_one_named_section() {
    let declaration = Arc::new(SectionDeclaration::new("Row", false));
    let annotations = vec![
        Annotation::SectionDeclaration(DeclarationAnnotation {
            declaration: Arc::clone(&declaration),
            span: Span::at(0),
        }),
        Annotation::Comment(CommentAnnotation {
            span: Span::at(0),
            text: "rows".to_string(),
        }),
        Annotation::SectionBounds(SectionBounds::new(declaration, 3)),
    ];
    let template = PreprocessedTemplate::new("rows", "hd\nr1\nft", annotations);
    let bindings = GenConfig::from_yaml_str(DOC_CONFIG).unwrap().binding;
    let tree = sectionize(&template, "Doc", &bindings).unwrap();

    assert_eq!(tree.root.find_all("Row").len(), 1);
    assert_eq!(
        leaf_kinds(&tree.root),
        vec!["comment \"rows\"", "raw \"hd\\n\"", "Row 3:6", "raw \"ft\""]
    );
    assert_eq!(tree.root.check_coverage(), Ok(()));
}

#[test]
fn unterminated_section_returns_no_tree() {
    let template = "head\n@Section(name=\"Block\" end=\"END\")\nbody\n";
    let err = fixture(CLASS_CONFIG, template).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Sectionizer(SectionizerError::UnterminatedSection { ref name, begin: 5, .. }) if name == "Block"
    ));
}
