//! Tree shape snapshots in the treeviz format

use wikitext_ast::wikitext::ast::NodeSnapshot;
use wikitext_ast::wikitext::formats::{to_json_str, to_treeviz_str, FormatRegistry};
use wikitext_ast::wikitext::parsing::MAX_STAGE;
use wikitext_ast::{parse, Tree};

fn parsed(source: &str) -> Tree {
    parse(source, false, MAX_STAGE).unwrap()
}

#[test]
fn test_template_tree() {
    let tree = parsed("{{tpl|a|b=c}}");
    insta::assert_snapshot!(to_treeviz_str(&tree), @r#"
    root
      template (Template:Tpl)
        template-name
          "tpl"
        parameter (1)
          parameter-key
          parameter-value
            "a"
        parameter (b)
          parameter-key
            "b"
          parameter-value
            "c"
    "#);
}

#[test]
fn test_heading_and_list_tree() {
    let tree = parsed("== A ==\n* x");
    insta::assert_snapshot!(to_treeviz_str(&tree), @r#"
    root
      heading (2)
        heading-title
          " A "
        heading-trail
      "\n"
      list
        "*"
      " x"
    "#);
}

#[test]
fn test_link_tree() {
    let tree = parsed("[[Foo|bar]]");
    insta::assert_snapshot!(to_treeviz_str(&tree), @r#"
    root
      link (Foo)
        link-target
          "Foo"
        link-text
          "bar"
    "#);
}

#[test]
fn test_extension_tree() {
    let tree = parsed("<ref name=\"x\">hi</ref>");
    insta::assert_snapshot!(to_treeviz_str(&tree), @r#"
    root
      ext (ref)
        attributes
          " "
          attribute (name)
            attr-value
              "x"
        ext-inner
          "hi"
    "#);
}

#[test]
fn test_table_tree() {
    let tree = parsed("{|\n| a || b\n|}");
    insta::assert_snapshot!(to_treeviz_str(&tree), @r#"
    root
      table
        table-syntax
          "{|"
        attributes
        td
          table-syntax
            "\n|"
          attributes
          td-inner
            " a "
        td
          table-syntax
            "||"
          attributes
          td-inner
            " b"
        table-syntax
          "\n|}"
    "#);
}

#[test]
fn test_json_output_mirrors_tree() {
    let tree = parsed("''a''");
    let json = to_json_str(&tree).unwrap();
    let snapshot: NodeSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot.node_type, "root");
    let types: Vec<_> = snapshot
        .children
        .iter()
        .map(|c| c.node_type.as_str())
        .collect();
    assert_eq!(types, vec!["quote", "text", "quote"]);
    assert_eq!(snapshot.children[0].attributes.get("italic").map(String::as_str), Some("true"));
}

#[test]
fn test_registry_formats_agree() {
    let tree = parsed("'''b''' [[c]]");
    let registry = FormatRegistry::with_defaults();
    assert_eq!(registry.serialize(&tree, "roundtrip").unwrap(), "'''b''' [[c]]");
    assert_eq!(registry.serialize(&tree, "treeviz").unwrap(), to_treeviz_str(&tree));
}
