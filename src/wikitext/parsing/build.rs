//! Build phase: sentinels back into nodes
//!
//! Every container resolves only its own text. Nesting is already correct:
//! a nested token was constructed, and its sentinel written, before the
//! sentinel of anything containing it. Derived attributes are computed only
//! once every container is resolved.

use super::accumulator::Accumulator;
use super::error::{ParseError, ParseErrorKind};
use super::sentinel::{self, Piece, SentinelKind};
use crate::wikitext::ast::{NodeId, Tree};
use std::sync::Arc;
use tracing::debug;

fn error(tree: &Tree, id: NodeId, stage: u8, kind: ParseErrorKind) -> ParseError {
    ParseError {
        kind,
        stage,
        text: tree.to_string(id),
        config: Arc::clone(tree.config()),
    }
}

pub(crate) fn build(tree: &mut Tree, accum: &Accumulator, stage: u8) -> Result<(), ParseError> {
    let root = tree.root();
    resolve(tree, accum, root, stage)?;
    for id in accum.iter() {
        resolve(tree, accum, id, stage)?;
    }

    for id in tree.descendants(root) {
        if tree
            .text(id)
            .is_some_and(|text| text.contains(['\0', '\x7F']))
        {
            let owner = tree.parent(id).unwrap_or(root);
            return Err(error(
                tree,
                owner,
                stage,
                ParseErrorKind::LeftoverSentinel { node: owner },
            ));
        }
    }

    tree.mark_built();
    tree.refresh_derived(root);
    for id in accum.iter() {
        tree.refresh_derived(id);
    }
    for id in std::iter::once(root).chain(accum.iter()) {
        if let Some(token) = tree.token_mut(id) {
            token.stage = None;
        }
    }
    debug!(tokens = accum.len(), "build complete");
    Ok(())
}

/// Replace every sentinel-bearing text child of `id` with what it encodes
fn resolve(tree: &mut Tree, accum: &Accumulator, id: NodeId, stage: u8) -> Result<(), ParseError> {
    let children = tree.children(id).to_vec();
    let pending = children
        .iter()
        .any(|&c| tree.text(c).is_some_and(|t| t.contains('\0')));
    if !pending {
        normalize(tree, id);
        return Ok(());
    }

    let mut resolved = Vec::with_capacity(children.len());
    for child in children {
        let Some(text) = tree.text(child).filter(|t| t.contains('\0')).map(str::to_string) else {
            resolved.push(child);
            continue;
        };
        for piece in sentinel::split(&text) {
            match piece {
                Piece::Literal(literal) => resolved.push(tree.create_text(literal)),
                Piece::Marker { digits, tag } => {
                    let Some((index, target)) = digits
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| accum.get(i).map(|t| (i, t)))
                    else {
                        return Err(error(
                            tree,
                            id,
                            stage,
                            ParseErrorKind::UnknownSentinel {
                                index: digits.to_string(),
                                accumulated: accum.len(),
                            },
                        ));
                    };
                    if tree.parent(target).is_some() || resolved.contains(&target) {
                        return Err(error(
                            tree,
                            id,
                            stage,
                            ParseErrorKind::DuplicateSentinel { index },
                        ));
                    }
                    let expected = tree
                        .token_kind(target)
                        .and_then(SentinelKind::for_token)
                        .map(SentinelKind::tag);
                    if expected != Some(tag) {
                        return Err(error(
                            tree,
                            id,
                            stage,
                            ParseErrorKind::TagMismatch {
                                index,
                                expected: expected.unwrap_or('?'),
                                found: tag,
                            },
                        ));
                    }
                    resolved.push(target);
                }
            }
        }
    }
    tree.replace_children(id, resolved);
    normalize(tree, id);
    Ok(())
}

/// Merge adjacent text children and drop empty ones
fn normalize(tree: &mut Tree, id: NodeId) {
    let children = tree.children(id).to_vec();
    let mut merged: Vec<NodeId> = Vec::with_capacity(children.len());
    for child in &children {
        if let Some(text) = tree.text(*child).map(str::to_string) {
            if text.is_empty() {
                continue;
            }
            if let Some(previous) = merged.last().and_then(|&last| tree.text(last).map(|t| (last, t.to_string()))) {
                tree.set_text_raw(previous.0, previous.1 + &text);
                continue;
            }
        }
        merged.push(*child);
    }
    if merged != children {
        tree.replace_children(id, merged);
    }
}
