//! Stage-by-stage behavior of the placeholder pipeline

use regex::Regex;
use rstest::rstest;
use std::collections::HashSet;
use wikitext_ast::wikitext::ast::TokenKind;
use wikitext_ast::wikitext::parsing::{ParseOptions, ParseSession, MAX_STAGE};
use wikitext_ast::{parse, Tree};

fn parsed(source: &str) -> Tree {
    parse(source, false, MAX_STAGE).unwrap()
}

#[test]
fn test_comment_sentinel_after_first_stage() {
    let mut session = ParseSession::new("a<!--b-->c", &ParseOptions::default());
    assert_eq!(session.stage(), Some(0));
    assert!(session.run_stage());
    assert_eq!(session.stage(), Some(1));
    assert_eq!(session.pending_text(), "a\u{0}0c\u{7f}c");
    assert_eq!(session.accumulator().len(), 1);
}

#[test]
fn test_template_sentinel_after_braces() {
    let mut session = ParseSession::new("x{{a|b}}", &ParseOptions::default());
    session.run_until(2);
    assert_eq!(session.pending_text(), "x\u{0}0t\u{7f}");
    // template, name, parameter, key, value
    assert_eq!(session.accumulator().len(), 5);
}

#[test]
fn test_build_is_idempotent() {
    let source = "== {{a|b}} ==\n* [[c|''d'']]";
    let mut session = ParseSession::new(source, &ParseOptions::default());
    session.run_until(MAX_STAGE);
    assert!(!session.run_stage());
    session.build().unwrap();
    let first = session.tree().to_string(session.tree().root());
    session.build().unwrap();
    assert_eq!(session.tree().to_string(session.tree().root()), first);
    assert_eq!(session.stage(), None);
    assert_eq!(first, source);
}

#[test]
fn test_sentinels_are_unique() {
    let source = "{{a|{{b}}}} [[c]] <!--d--> '''e''' http://f.org\n{|\n| g || h\n|}";
    let mut session = ParseSession::new(source, &ParseOptions::default());
    session.run_until(MAX_STAGE);
    let pending = session.pending_text();
    let marker = Regex::new(r"\x00(\d+)([a-z!])\x7F").unwrap();
    let mut seen = HashSet::new();
    for caps in marker.captures_iter(&pending) {
        let index: usize = caps[1].parse().unwrap();
        assert!(index < session.accumulator().len());
        assert!(seen.insert(index), "sentinel {} appears twice", index);
    }
    assert!(!seen.is_empty());
    let tree = session.finish().unwrap();
    assert_eq!(tree.to_string(tree.root()), source);
}

#[rstest]
#[case(1, None)]
#[case(5, None)]
#[case(6, Some(TokenKind::Link))]
#[case(7, Some(TokenKind::Quote))]
fn test_stage_limit(#[case] max_stage: u8, #[case] deepest: Option<TokenKind>) {
    let source = "[[a]] ''b''";
    let tree = parse(source, false, max_stage).unwrap();
    let found_link = tree.find_first(tree.root(), TokenKind::Link).is_some();
    let found_quote = tree.find_first(tree.root(), TokenKind::Quote).is_some();
    match deepest {
        None => assert!(!found_link && !found_quote),
        Some(TokenKind::Link) => assert!(found_link && !found_quote),
        Some(_) => assert!(found_link && found_quote),
    }
    assert_eq!(tree.to_string(tree.root()), source);
}

/// An inner construct ends up inside the outer one no matter which stage
/// recognizes which
#[rstest]
#[case("{|\n| {{a|b}} || c\n|}", TokenKind::Template, TokenKind::Td)]
#[case("{|\n|-\n| [[a|b]] || c\n|}", TokenKind::Link, TokenKind::Td)]
#[case("[[a|{{b}}]]", TokenKind::Template, TokenKind::Link)]
#[case("== {{a}} ==", TokenKind::Template, TokenKind::Heading)]
#[case("{{a|<ref>x|y</ref>}}", TokenKind::Ext, TokenKind::Template)]
#[case("[[a|''b'']]", TokenKind::Quote, TokenKind::Link)]
#[case("{{a|[http://x.org b]}}", TokenKind::ExtLink, TokenKind::Template)]
#[case("{{a|\n* x}}", TokenKind::ListMarker, TokenKind::Template)]
#[case("<ref>[[a]]</ref>", TokenKind::Link, TokenKind::Ext)]
#[case("-{zh-hans:[[a]]}-", TokenKind::Link, TokenKind::Converter)]
fn test_nesting_across_stages(#[case] source: &str, #[case] inner: TokenKind, #[case] outer: TokenKind) {
    let tree = parsed(source);
    let node = tree
        .find_first(tree.root(), inner)
        .unwrap_or_else(|| panic!("{} not recognized in {:?}", inner, source));
    assert!(tree.closest(node, outer).is_some());
    assert_eq!(tree.to_string(tree.root()), source);
}

#[test]
fn test_pipe_inside_template_is_not_a_cell_separator() {
    let tree = parsed("{|\n| {{a|b}} || c\n|}");
    assert_eq!(tree.find_all(tree.root(), TokenKind::Td).len(), 2);
    let template = tree.find_first(tree.root(), TokenKind::Template).unwrap();
    assert_eq!(tree.params(template).len(), 1);
}

#[test]
fn test_extension_hides_pipes_from_templates() {
    let tree = parsed("{{a|<ref>x|y</ref>}}");
    let template = tree.find_first(tree.root(), TokenKind::Template).unwrap();
    assert_eq!(tree.params(template).len(), 1);
}

#[test]
fn test_comment_hides_braces() {
    let tree = parsed("<!-- {{a}} -->");
    assert!(tree.find_first(tree.root(), TokenKind::Template).is_none());
}

#[test]
fn test_pipe_inside_link_is_not_a_parameter_separator() {
    let tree = parsed("{{a|[[b|c]]}}");
    let template = tree.find_first(tree.root(), TokenKind::Template).unwrap();
    assert_eq!(tree.params(template).len(), 1);
    let link = tree.find_first(template, TokenKind::Link).unwrap();
    assert_eq!(tree.name(link), Some("B"));
}

#[test]
fn test_nothing_links_inside_external_link_label() {
    let tree = parsed("[http://a.org see http://b.org]");
    assert!(tree.find_first(tree.root(), TokenKind::MagicLink).is_none());
    assert!(tree.find_first(tree.root(), TokenKind::ExtLink).is_some());
}
