//! Traversal and lookup helpers

use super::kind::TokenKind;
use super::node::{NodeId, Payload};
use super::tree::Tree;

impl Tree {
    /// All nodes under `id` in document order, `id` excluded
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn find_all(&self, id: NodeId, kind: TokenKind) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.is_kind(n, kind))
            .collect()
    }

    pub fn find_first(&self, id: NodeId, kind: TokenKind) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|&n| self.is_kind(n, kind))
    }

    /// `id` itself or its nearest ancestor of `kind`
    pub fn closest(&self, id: NodeId, kind: TokenKind) -> Option<NodeId> {
        if self.is_kind(id, kind) {
            return Some(id);
        }
        self.ancestors(id)
            .into_iter()
            .find(|&n| self.is_kind(n, kind))
    }

    /// Parameters of a template or parser function
    pub fn params(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_kind(c, TokenKind::Parameter))
            .collect()
    }

    /// The effective parameter called `name`; the last one wins on repeats
    pub fn get_param(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let name = name.trim();
        self.params(id)
            .into_iter()
            .rev()
            .find(|&p| self.name(p) == Some(name))
    }

    pub fn has_param(&self, id: NodeId, name: &str) -> bool {
        self.get_param(id, name).is_some()
    }

    /// Serialized value of a parameter
    pub fn param_value(&self, param: NodeId) -> Option<String> {
        self.child(param, 1).map(|value| self.to_string(value))
    }

    pub fn is_anonymous(&self, param: NodeId) -> bool {
        matches!(
            self.payload(param),
            Some(Payload::Parameter { anonymous: true })
        )
    }

    /// Sort key of a category link, the text after its pipe
    pub fn sort_key(&self, category: NodeId) -> Option<String> {
        if !self.is_kind(category, TokenKind::Category) {
            return None;
        }
        self.child(category, 1)
            .map(|key| self.text_without_comments(key))
    }
}
