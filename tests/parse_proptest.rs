//! Property-based tests for parsing
//!
//! Inputs are stitched together from fragments of wikitext syntax so that
//! partial, nested and unbalanced constructs come up far more often than
//! they would with random characters.

use proptest::prelude::*;
use wikitext_ast::wikitext::ast::{NodeKind, TokenKind};
use wikitext_ast::NodeId;
use wikitext_ast::wikitext::parsing::MAX_STAGE;
use wikitext_ast::{parse, Tree};

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("{{".to_string()),
        Just("}}".to_string()),
        Just("{{{".to_string()),
        Just("}}}".to_string()),
        Just("[[".to_string()),
        Just("]]".to_string()),
        Just("[".to_string()),
        Just("]".to_string()),
        Just("|".to_string()),
        Just("=".to_string()),
        Just("==".to_string()),
        Just(":".to_string()),
        Just("''".to_string()),
        Just("'''".to_string()),
        Just("\n".to_string()),
        Just("\n{|".to_string()),
        Just("\n|}".to_string()),
        Just("\n|-".to_string()),
        Just("\n! ".to_string()),
        Just("||".to_string()),
        Just("{{!}}".to_string()),
        Just("<!--".to_string()),
        Just("-->".to_string()),
        Just("<ref>".to_string()),
        Just("</ref>".to_string()),
        Just("<nowiki>".to_string()),
        Just("</nowiki>".to_string()),
        Just("<b class=x>".to_string()),
        Just("</b>".to_string()),
        Just("<br/>".to_string()),
        Just("<noinclude>".to_string()),
        Just("-{".to_string()),
        Just("}-".to_string()),
        Just("\n*".to_string()),
        Just("\n;".to_string()),
        Just("\n----".to_string()),
        Just("__TOC__".to_string()),
        Just("#if:".to_string()),
        Just("File:".to_string()),
        Just("Category:".to_string()),
        Just("http://x.org".to_string()),
        Just(" ISBN 0306406152".to_string()),
        Just("zh-hans:".to_string()),
        Just("é".to_string()),
        "[a-z ]{1,4}",
    ]
}

fn wikitext() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..24).prop_map(|parts| parts.concat())
}

fn check_acceptance(tree: &Tree) -> Result<(), TestCaseError> {
    check_nodes(tree, &tree.descendants(tree.root()))
}

fn check_nodes(tree: &Tree, nodes: &[NodeId]) -> Result<(), TestCaseError> {
    for &id in nodes {
        let NodeKind::Token(token) = tree.kind(id) else {
            continue;
        };
        if let Some(table) = token.acceptable() {
            let layout: Vec<_> = tree
                .children(id)
                .iter()
                .map(|&child| tree.child_kind(child))
                .collect();
            prop_assert_eq!(
                table.first_violation(&layout),
                None,
                "{} has children {:?}",
                token.kind,
                layout
            );
        }
    }
    Ok(())
}

/// At least one of each structured construct
const MUTATION_FIXTURE: &str = "{{a|b|c=d}} {{{x|y|z}}} {{#if:1|2|3}}\n\
== h <!-- c --> ==\n\
{| class=x\n|+ cap\n|-\n! h1 !! h2\n|-\n| p || style=s | q\n|}\n\
[[L|t]] [[File:F.png|thumb|c]] [[Category:K|s]] [http://x.org e]\n\
-{zh-hans:a;zh-tw:b}- <ref name=r>n</ref> <span id=i>s</span>";

#[derive(Debug, Clone)]
enum Mutation {
    Insert {
        parent: prop::sample::Index,
        child: prop::sample::Index,
        index: isize,
    },
    Remove {
        parent: prop::sample::Index,
        index: isize,
    },
}

fn mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        (any::<prop::sample::Index>(), any::<prop::sample::Index>(), -4isize..6)
            .prop_map(|(parent, child, index)| Mutation::Insert { parent, child, index }),
        (any::<prop::sample::Index>(), -4isize..6)
            .prop_map(|(parent, index)| Mutation::Remove { parent, index }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn parse_round_trips(source in wikitext()) {
        let tree = parse(&source, false, MAX_STAGE).unwrap();
        prop_assert_eq!(tree.to_string(tree.root()), source);
    }

    #[test]
    fn include_mode_round_trips(source in wikitext()) {
        let tree = parse(&source, true, MAX_STAGE).unwrap();
        prop_assert_eq!(tree.to_string(tree.root()), source);
    }

    #[test]
    fn every_stage_limit_round_trips(source in wikitext(), max_stage in 0u8..=MAX_STAGE) {
        let tree = parse(&source, false, max_stage).unwrap();
        prop_assert_eq!(tree.to_string(tree.root()), source);
    }

    #[test]
    fn built_trees_satisfy_acceptance(source in wikitext()) {
        let tree = parse(&source, false, MAX_STAGE).unwrap();
        check_acceptance(&tree)?;
    }

    #[test]
    fn offsets_agree_with_serialization(source in wikitext()) {
        let tree = parse(&source, false, MAX_STAGE).unwrap();
        let whole = tree.to_string(tree.root());
        for id in tree.descendants(tree.root()) {
            let start = tree.absolute_offset(id);
            let end = start + tree.text_len(id);
            let rendered = tree.to_string(id);
            prop_assert_eq!(&whole[start..end], rendered.as_str());
        }
    }

    #[test]
    fn removing_parameters_keeps_templates_valid(source in wikitext(), pick in any::<prop::sample::Index>()) {
        let mut tree = parse(&source, false, MAX_STAGE).unwrap();
        let templates = tree.find_all(tree.root(), TokenKind::Template);
        if templates.is_empty() {
            return Ok(());
        }
        let template = templates[pick.index(templates.len())];
        let count = tree.child_count(template) as isize;
        for index in (0..count).rev() {
            let _ = tree.remove_at(template, index);
        }
        prop_assert_eq!(tree.child_count(template), 1);
        check_acceptance(&tree)?;
    }

    #[test]
    fn checked_mutations_never_break_acceptance(ops in prop::collection::vec(mutation(), 1..40)) {
        let mut tree = parse(MUTATION_FIXTURE, false, MAX_STAGE).unwrap();
        // detached nodes stay in the pool so later steps can move them back
        let pool = tree.descendants(tree.root());
        let mut tokens = vec![tree.root()];
        tokens.extend(pool.iter().copied().filter(|&id| tree.token(id).is_some()));
        check_nodes(&tree, &pool)?;

        for op in ops {
            let before = tree.to_string(tree.root());
            let result = match op {
                Mutation::Insert { parent, child, index } => {
                    let parent = tokens[parent.index(tokens.len())];
                    let child = pool[child.index(pool.len())];
                    tree.insert_at(parent, child, index).map(|_| ())
                }
                Mutation::Remove { parent, index } => {
                    let parent = tokens[parent.index(tokens.len())];
                    tree.remove_at(parent, index).map(|_| ())
                }
            };
            if result.is_err() {
                prop_assert_eq!(tree.to_string(tree.root()), before);
            }
            check_nodes(&tree, &pool)?;
        }
    }
}
