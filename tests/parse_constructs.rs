//! End-to-end parsing of individual constructs

use rstest::rstest;
use wikitext_ast::wikitext::ast::{Payload, TokenKind};
use wikitext_ast::wikitext::parsing::MAX_STAGE;
use wikitext_ast::{parse, NodeId, Tree};

fn parsed(source: &str) -> Tree {
    parse(source, false, MAX_STAGE).unwrap()
}

fn first(tree: &Tree, kind: TokenKind) -> NodeId {
    tree.find_first(tree.root(), kind)
        .unwrap_or_else(|| panic!("no {} in tree", kind))
}

#[test]
fn test_template_parameters() {
    let mut tree = parsed("{{tpl|a|b=c}}");
    let template = first(&tree, TokenKind::Template);
    assert_eq!(tree.name(template), Some("Template:Tpl"));

    let names: Vec<_> = tree
        .params(template)
        .into_iter()
        .map(|p| tree.name(p).unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["1", "b"]);

    let b = tree.get_param(template, "b").unwrap();
    assert!(!tree.is_anonymous(b));
    assert_eq!(tree.param_value(b).as_deref(), Some("c"));

    tree.remove_at(template, 2).unwrap();
    assert_eq!(tree.to_string(tree.root()), "{{tpl|a}}");
}

#[test]
fn test_argument_with_default() {
    let tree = parsed("{{{1|default}}}");
    let arg = first(&tree, TokenKind::Arg);
    assert_eq!(tree.name(arg), Some("1"));
    let default = tree.child(arg, 1).unwrap();
    assert!(tree.is_kind(default, TokenKind::ArgDefault));
    assert_eq!(tree.to_string(default), "default");
}

#[test]
fn test_extension_tag_attributes() {
    let tree = parsed("<ref name=\"x\">hi</ref>");
    let ext = first(&tree, TokenKind::Ext);
    assert_eq!(tree.name(ext), Some("ref"));
    assert_eq!(tree.get_attr(ext, "name").as_deref(), Some("x"));
    assert_eq!(tree.get_attr(ext, "group"), None);
    let inner = tree.child(ext, 1).unwrap();
    assert!(tree.is_kind(inner, TokenKind::ExtInner));
    assert_eq!(tree.to_string(inner), "hi");
}

#[test]
fn test_unbalanced_braces_stay_text() {
    let tree = parsed("{{{{{{too-deep");
    assert_eq!(tree.to_string(tree.root()), "{{{{{{too-deep");
    assert!(tree
        .children(tree.root())
        .iter()
        .all(|&child| tree.is_text(child)));
}

#[test]
fn test_escape_inside_template() {
    let tree = parsed("{{a|b{{!}}c}}");
    let template = first(&tree, TokenKind::Template);
    assert_eq!(tree.params(template).len(), 1);
    assert!(tree.find_first(template, TokenKind::Escape).is_some());
}

#[test]
fn test_parser_function() {
    let tree = parsed("{{#if: x | yes | no}}");
    let word = first(&tree, TokenKind::MagicWord);
    assert_eq!(tree.name(word), Some("if"));
    assert_eq!(tree.payload(word), Some(&Payload::MagicWord { colon: true }));
    assert_eq!(tree.params(word).len(), 3);
    assert_eq!(tree.to_string(tree.root()), "{{#if: x | yes | no}}");
}

#[test]
fn test_simple_table() {
    let source = "{|\n| a || b\n|}";
    let tree = parsed(source);
    let table = first(&tree, TokenKind::Table);
    assert_eq!(tree.find_all(table, TokenKind::Td).len(), 2);
    assert_eq!(tree.to_string(tree.root()), source);
}

#[test]
fn test_table_rows_and_attributes() {
    let source = "{| class=\"wikitable\"\n|-\n! style=\"x\" | h\n|-\n| c\n|}";
    let tree = parsed(source);
    let table = first(&tree, TokenKind::Table);
    assert_eq!(tree.get_attr(table, "class").as_deref(), Some("wikitable"));
    assert_eq!(tree.find_all(table, TokenKind::Tr).len(), 2);
    let header = first(&tree, TokenKind::Td);
    assert_eq!(tree.get_attr(header, "style").as_deref(), Some("x"));
    assert_eq!(tree.to_string(tree.root()), source);
}

#[test]
fn test_heading() {
    let tree = parsed("== A ==\ntext");
    let heading = first(&tree, TokenKind::Heading);
    assert_eq!(tree.name(heading), Some("2"));
    assert_eq!(tree.payload(heading), Some(&Payload::Heading { level: 2 }));
    assert_eq!(tree.to_string(tree.child(heading, 0).unwrap()), " A ");
}

#[rstest]
#[case("[[Foo|bar]]", TokenKind::Link, "Foo")]
#[case("[[foo_bar]]", TokenKind::Link, "Foo bar")]
#[case("[[Category:Birds]]", TokenKind::Category, "Category:Birds")]
#[case("[[:Category:Birds]]", TokenKind::Link, "Category:Birds")]
#[case("[[File:x.png|thumb|cap]]", TokenKind::FileLink, "File:X.png")]
fn test_link_kinds(#[case] source: &str, #[case] kind: TokenKind, #[case] name: &str) {
    let tree = parsed(source);
    let link = first(&tree, kind);
    assert_eq!(tree.name(link), Some(name));
    assert_eq!(tree.to_string(tree.root()), source);
}

#[test]
fn test_file_link_parameters() {
    let tree = parsed("[[File:x.png|thumb|a [[b]] c]]");
    let file = first(&tree, TokenKind::FileLink);
    assert_eq!(tree.find_all(file, TokenKind::ImageParameter).len(), 2);
    assert_eq!(tree.find_all(file, TokenKind::Link).len(), 1);
}

#[test]
fn test_bold_and_italic() {
    let tree = parsed("'''b''' and ''i''");
    let quotes = tree.find_all(tree.root(), TokenKind::Quote);
    assert_eq!(quotes.len(), 4);
    assert_eq!(
        tree.payload(quotes[0]),
        Some(&Payload::Quote {
            bold: true,
            italic: false
        })
    );
    assert_eq!(
        tree.payload(quotes[3]),
        Some(&Payload::Quote {
            bold: false,
            italic: true
        })
    );
}

#[test]
fn test_external_link() {
    let tree = parsed("[http://example.com label]");
    let link = first(&tree, TokenKind::ExtLink);
    assert_eq!(tree.to_string(tree.child(link, 0).unwrap()), "http://example.com");
    assert_eq!(tree.to_string(tree.child(link, 1).unwrap()), "label");
}

#[rstest]
#[case("see http://example.org now", "http://example.org")]
#[case("see http://example.org/a, then", "http://example.org/a")]
#[case("ISBN 0-306-40615-2", "ISBN 0-306-40615-2")]
#[case("RFC 2616", "RFC 2616")]
fn test_magic_links(#[case] source: &str, #[case] link: &str) {
    let tree = parsed(source);
    let magic = first(&tree, TokenKind::MagicLink);
    assert_eq!(tree.to_string(magic), link);
}

#[test]
fn test_definition_list() {
    let tree = parsed(";term:definition\n* item");
    let markers: Vec<_> = tree
        .find_all(tree.root(), TokenKind::ListMarker)
        .into_iter()
        .map(|m| tree.to_string(m))
        .collect();
    assert_eq!(markers, vec![";", "*"]);
    assert_eq!(tree.find_all(tree.root(), TokenKind::Dd).len(), 1);
}

#[test]
fn test_converter_rules() {
    let source = "-{zh-hans:计算机;zh-tw:電腦}-";
    let tree = parsed(source);
    let converter = first(&tree, TokenKind::Converter);
    assert_eq!(tree.find_all(converter, TokenKind::ConverterRule).len(), 2);
    assert_eq!(tree.to_string(tree.root()), source);
}

#[rstest]
#[case("a<!-- b -->c", true)]
#[case("a<!-- b", false)]
fn test_comments(#[case] source: &str, #[case] closed: bool) {
    let tree = parsed(source);
    let comment = first(&tree, TokenKind::Comment);
    assert_eq!(tree.payload(comment), Some(&Payload::Comment { closed }));
    assert_eq!(tree.to_string(tree.root()), source);
}

#[rstest]
#[case(false, 2)]
#[case(true, 1)]
fn test_inclusion_modes(#[case] include: bool, #[case] markers: usize) {
    let source = "<noinclude>x</noinclude>y";
    let tree = parse(source, include, MAX_STAGE).unwrap();
    assert_eq!(tree.find_all(tree.root(), TokenKind::Include).len(), markers);
    assert_eq!(tree.to_string(tree.root()), source);
}

#[test]
fn test_control_characters_are_dropped() {
    let tree = parsed("a\0b\x7Fc");
    assert_eq!(tree.to_string(tree.root()), "abc");
}

#[test]
fn test_category_sort_key() {
    let tree = parsed("[[Category:Birds|Sparrow]] [[Category:Fish]]");
    let categories = tree.find_all(tree.root(), TokenKind::Category);
    assert_eq!(categories.len(), 2);
    assert_eq!(tree.sort_key(categories[0]).as_deref(), Some("Sparrow"));
    assert_eq!(tree.sort_key(categories[1]), None);
}
