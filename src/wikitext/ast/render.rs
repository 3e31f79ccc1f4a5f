//! Serialization and geometry
//!
//! Each token kind describes its serialized form as a sequence of [`Part`]s:
//! literal delimiters interleaved with references to its children. The same
//! layout drives [`Tree::to_string`] and child offsets, so offsets can never
//! drift from what is printed.
//!
//! A node's string is cached once the tree is built. Mutation clears the cache
//! of the touched node and its ancestors.

use super::kind::TokenKind;
use super::node::{NodeId, NodeKind, Payload};
use super::range::{Position, Range, SourceLocation};
use super::tree::Tree;
use std::borrow::Cow;

/// One piece of a token's serialized form
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Part<'a> {
    Lit(Cow<'a, str>),
    Child(usize),
}

fn lit(s: &'static str) -> Part<'static> {
    Part::Lit(Cow::Borrowed(s))
}

/// `open child0 sep child1 sep … close`
fn joined(count: usize, open: &'static str, sep: &'static str, close: &'static str) -> Vec<Part<'static>> {
    let mut parts = vec![lit(open)];
    for i in 0..count {
        if i > 0 {
            parts.push(lit(sep));
        }
        parts.push(Part::Child(i));
    }
    parts.push(lit(close));
    parts
}

fn child_if(parts: &mut Vec<Part<'_>>, index: usize, count: usize) {
    if index < count {
        parts.push(Part::Child(index));
    }
}

impl Tree {
    /// Serialized layout of a token; empty for text nodes
    pub(crate) fn layout(&self, id: NodeId) -> Vec<Part<'_>> {
        let Some(token) = self.token(id) else {
            return Vec::new();
        };
        let count = self.child_count(id);
        let all = || (0..count).map(Part::Child).collect::<Vec<_>>();

        match (&token.kind, &token.payload) {
            (TokenKind::Comment, Payload::Comment { closed }) => {
                let mut parts = vec![lit("<!--")];
                parts.extend(all());
                if *closed {
                    parts.push(lit("-->"));
                }
                parts
            }
            (
                TokenKind::Ext,
                Payload::Ext {
                    raw_name,
                    self_closing,
                    closing,
                },
            ) => {
                let mut parts = vec![lit("<"), Part::Lit(Cow::Borrowed(raw_name.as_str()))];
                child_if(&mut parts, 0, count);
                if *self_closing {
                    parts.push(lit("/>"));
                } else {
                    parts.push(lit(">"));
                    for i in 1..count {
                        parts.push(Part::Child(i));
                    }
                    parts.push(Part::Lit(Cow::Borrowed(closing.as_str())));
                }
                parts
            }
            (
                TokenKind::Html,
                Payload::Html {
                    raw_name,
                    closing,
                    self_closing,
                },
            ) => {
                let mut parts = vec![lit(if *closing { "</" } else { "<" })];
                parts.push(Part::Lit(Cow::Borrowed(raw_name.as_str())));
                parts.extend(all());
                parts.push(lit(if *self_closing { "/>" } else { ">" }));
                parts
            }
            (
                TokenKind::Attribute,
                Payload::Attribute {
                    key,
                    equal,
                    quote,
                    closed,
                },
            ) => {
                let mut parts = vec![
                    Part::Lit(Cow::Borrowed(key.as_str())),
                    Part::Lit(Cow::Borrowed(equal.as_str())),
                ];
                if let Some(q) = quote {
                    parts.push(Part::Lit(Cow::Owned(q.to_string())));
                }
                parts.extend(all());
                if let (Some(q), true) = (quote, *closed) {
                    parts.push(Part::Lit(Cow::Owned(q.to_string())));
                }
                parts
            }
            (TokenKind::Template, _) => joined(count, "{{", "|", "}}"),
            (TokenKind::Arg, _) => joined(count, "{{{", "|", "}}}"),
            (TokenKind::MagicWord, Payload::MagicWord { colon }) => {
                let mut parts = vec![lit("{{")];
                for i in 0..count {
                    match i {
                        0 => {}
                        1 if *colon => parts.push(lit(":")),
                        _ => parts.push(lit("|")),
                    }
                    parts.push(Part::Child(i));
                }
                parts.push(lit("}}"));
                parts
            }
            (TokenKind::Escape, _) => {
                let mut parts = vec![lit("{{")];
                parts.extend(all());
                parts.push(lit("}}"));
                parts
            }
            (TokenKind::Parameter, Payload::Parameter { anonymous: true }) => {
                let mut parts = Vec::new();
                child_if(&mut parts, 1, count);
                parts
            }
            (TokenKind::Parameter, _) => {
                let mut parts = Vec::new();
                child_if(&mut parts, 0, count);
                parts.push(lit("="));
                child_if(&mut parts, 1, count);
                parts
            }
            (TokenKind::Td, Payload::Td { attr_separator }) => {
                let mut parts = Vec::new();
                child_if(&mut parts, 0, count);
                child_if(&mut parts, 1, count);
                if *attr_separator {
                    parts.push(lit("|"));
                }
                for i in 2..count {
                    parts.push(Part::Child(i));
                }
                parts
            }
            (TokenKind::Heading, Payload::Heading { level }) => {
                let marks = "=".repeat(*level);
                let mut parts = vec![Part::Lit(Cow::Owned(marks.clone()))];
                child_if(&mut parts, 0, count);
                parts.push(Part::Lit(Cow::Owned(marks)));
                for i in 1..count {
                    parts.push(Part::Child(i));
                }
                parts
            }
            (TokenKind::Link | TokenKind::FileLink | TokenKind::Category, _) => {
                joined(count, "[[", "|", "]]")
            }
            (TokenKind::ExtLink, Payload::ExtLink { space }) => {
                let mut parts = vec![lit("[")];
                child_if(&mut parts, 0, count);
                parts.push(Part::Lit(Cow::Borrowed(space.as_str())));
                for i in 1..count {
                    parts.push(Part::Child(i));
                }
                parts.push(lit("]"));
                parts
            }
            (TokenKind::Converter, Payload::Converter { has_flags }) => {
                let mut parts = vec![lit("-{")];
                if *has_flags {
                    child_if(&mut parts, 0, count);
                    parts.push(lit("|"));
                }
                for i in 1..count {
                    if i > 1 {
                        parts.push(lit(";"));
                    }
                    parts.push(Part::Child(i));
                }
                parts.push(lit("}-"));
                parts
            }
            (TokenKind::ConverterRule, Payload::ConverterRule { arrow, colon }) => {
                let mut parts = Vec::new();
                child_if(&mut parts, 0, count);
                if *arrow {
                    parts.push(lit("=>"));
                }
                child_if(&mut parts, 1, count);
                if *colon {
                    parts.push(lit(":"));
                }
                for i in 2..count {
                    parts.push(Part::Child(i));
                }
                parts
            }
            _ => all(),
        }
    }

    /// Serialized source of a node
    pub fn to_string(&self, id: NodeId) -> String {
        let node = self.node(id);
        if let NodeKind::Text(text) = &node.kind {
            return text.clone();
        }
        if let Some(cached) = node.cache.get() {
            return cached.clone();
        }
        let mut out = String::new();
        for part in self.layout(id) {
            match part {
                Part::Lit(s) => out.push_str(&s),
                Part::Child(i) => {
                    if let Some(child) = self.child(id, i) {
                        out.push_str(&self.to_string(child));
                    }
                }
            }
        }
        if self.is_built() {
            let _ = node.cache.set(out.clone());
        }
        out
    }

    /// Serialized length in bytes
    pub fn text_len(&self, id: NodeId) -> usize {
        match &self.node(id).kind {
            NodeKind::Text(text) => text.len(),
            NodeKind::Token(_) => self.to_string(id).len(),
        }
    }

    /// Byte offset of every child within the serialization of `id`
    pub fn child_offsets(&self, id: NodeId) -> Vec<usize> {
        let mut offsets = vec![0; self.child_count(id)];
        let mut cursor = 0;
        for part in self.layout(id) {
            match part {
                Part::Lit(s) => cursor += s.len(),
                Part::Child(i) => {
                    if let Some(child) = self.child(id, i) {
                        offsets[i] = cursor;
                        cursor += self.text_len(child);
                    }
                }
            }
        }
        offsets
    }

    /// Offset of `id` within its parent's serialization
    pub fn offset_in_parent(&self, id: NodeId) -> usize {
        match (self.parent(id), self.index_in_parent(id)) {
            (Some(parent), Some(index)) => self.child_offsets(parent)[index],
            _ => 0,
        }
    }

    /// Offset of `id` within the serialization of its top ancestor
    pub fn absolute_offset(&self, id: NodeId) -> usize {
        let mut offset = self.offset_in_parent(id);
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            offset += self.offset_in_parent(parent);
            current = parent;
        }
        offset
    }

    pub fn range(&self, id: NodeId) -> Range {
        let start = self.absolute_offset(id);
        let source = SourceLocation::new(&self.to_string(self.top(id)));
        source.span_to_range(start..start + self.text_len(id))
    }

    /// Line and column where `id` starts
    pub fn position(&self, id: NodeId) -> Position {
        self.range(id).start
    }

    /// Deepest node under the root whose span contains `offset`
    pub fn node_at(&self, offset: usize) -> Option<NodeId> {
        let root = self.root();
        if offset >= self.text_len(root) {
            return None;
        }
        let mut current = root;
        let mut base = 0;
        'descend: loop {
            let offsets = self.child_offsets(current);
            for (i, &child) in self.children(current).iter().enumerate() {
                let start = base + offsets[i];
                let end = start + self.text_len(child);
                if (start..end).contains(&offset) {
                    current = child;
                    base = start;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// Serialization of `id` without comments or inclusion markup; the text
    /// derived names are computed from
    pub fn text_without_comments(&self, id: NodeId) -> String {
        match &self.node(id).kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Token(token) => match token.kind {
                TokenKind::Comment | TokenKind::Include => String::new(),
                _ => {
                    let mut out = String::new();
                    for part in self.layout(id) {
                        match part {
                            Part::Lit(s) => out.push_str(&s),
                            Part::Child(i) => {
                                if let Some(child) = self.child(id, i) {
                                    out.push_str(&self.text_without_comments(child));
                                }
                            }
                        }
                    }
                    out
                }
            },
        }
    }
}
