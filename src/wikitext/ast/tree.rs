//! The arena tree and its checked mutation API
//!
//! Every structural change goes through a small set of operations
//! ([`Tree::insert_at`], [`Tree::remove_at`], [`Tree::replace_child`],
//! [`Tree::set_text`]). Each one validates the resulting child list of every
//! parent it touches against that parent's acceptance table and protected
//! positions before changing anything. After the change it invalidates the
//! serialization cache of the parent and its ancestors, refreshes derived
//! attributes and dispatches a user event.
//!
//! Inside [`Tree::trusted`] checks and events are skipped; the parser builds
//! every tree that way.

use super::acceptance::{acceptable_for, protected_for};
use super::error::TreeError;
use super::events::{EventData, EventType};
use super::kind::{ChildKind, TokenKind};
use super::node::{NodeData, NodeId, NodeKind, Payload, TokenData};
use crate::wikitext::config::Config;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

pub struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
    config: Arc<Config>,
    include: bool,
    built: bool,
    trusted: bool,
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("built", &self.built)
            .field("include", &self.include)
            .finish()
    }
}

/// Scoped trusted mode; the previous mode comes back when this is dropped,
/// including on early return and unwinding
pub struct Trusted<'t> {
    tree: &'t mut Tree,
    previous: bool,
}

impl Deref for Trusted<'_> {
    type Target = Tree;

    fn deref(&self) -> &Tree {
        self.tree
    }
}

impl DerefMut for Trusted<'_> {
    fn deref_mut(&mut self) -> &mut Tree {
        self.tree
    }
}

impl Drop for Trusted<'_> {
    fn drop(&mut self) {
        self.tree.trusted = self.previous;
    }
}

fn resolve_insert(index: isize, len: usize) -> Result<usize, TreeError> {
    let resolved = if index < 0 {
        len as isize + index
    } else {
        index
    };
    if resolved < 0 || resolved as usize > len {
        return Err(TreeError::IndexOutOfRange { index, len });
    }
    Ok(resolved as usize)
}

fn resolve_existing(index: isize, len: usize) -> Result<usize, TreeError> {
    let resolved = if index < 0 {
        len as isize + index
    } else {
        index
    };
    if resolved < 0 || resolved as usize >= len {
        return Err(TreeError::IndexOutOfRange { index, len });
    }
    Ok(resolved as usize)
}

impl Tree {
    /// An empty, built document
    pub fn new(config: Arc<Config>) -> Self {
        let mut tree = Self::with_source("", config, false);
        let root = tree.root;
        tree.replace_children(root, Vec::new());
        if let Some(root) = tree.token_mut(root) {
            root.stage = None;
        }
        tree.built = true;
        tree
    }

    /// An unbuilt tree whose root holds `source` as its pending text
    pub(crate) fn with_source(source: &str, config: Arc<Config>, include: bool) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            config,
            include,
            built: false,
            trusted: false,
        };
        let mut root = TokenData::new(TokenKind::Root);
        root.stage = Some(0);
        let root = tree.alloc(NodeKind::Token(root));
        let text = tree.alloc(NodeKind::Text(source.to_string()));
        tree.attach(root, text);
        tree.root = root;
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Whether the tree was parsed for transclusion
    pub fn include(&self) -> bool {
        self.include
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub(crate) fn mark_built(&mut self) {
        self.built = true;
    }

    pub fn is_trusted(&self) -> bool {
        self.trusted
    }

    /// Enter trusted mode until the returned guard is dropped
    pub fn trusted(&mut self) -> Trusted<'_> {
        let previous = self.trusted;
        self.trusted = true;
        Trusted {
            tree: self,
            previous,
        }
    }

    /// Number of nodes in the arena, detached ones included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        id
    }

    // Navigation

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn child_kind(&self, id: NodeId) -> ChildKind {
        self.node(id).kind.child_kind()
    }

    pub fn token(&self, id: NodeId) -> Option<&TokenData> {
        match &self.node(id).kind {
            NodeKind::Token(token) => Some(token),
            NodeKind::Text(_) => None,
        }
    }

    pub(crate) fn token_mut(&mut self, id: NodeId) -> Option<&mut TokenData> {
        match &mut self.node_mut(id).kind {
            NodeKind::Token(token) => Some(token),
            NodeKind::Text(_) => None,
        }
    }

    pub fn token_kind(&self, id: NodeId) -> Option<TokenKind> {
        self.token(id).map(|t| t.kind)
    }

    pub fn is_kind(&self, id: NodeId, kind: TokenKind) -> bool {
        self.token_kind(id) == Some(kind)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Text(_))
    }

    /// Content of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Token(_) => None,
        }
    }

    /// `"text"` for text nodes, the token's type tag otherwise
    pub fn type_name(&self, id: NodeId) -> &'static str {
        self.token_kind(id).map_or("text", TokenKind::type_name)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.token(id).and_then(|t| t.name.as_deref())
    }

    pub fn payload(&self, id: NodeId) -> Option<&Payload> {
        self.token(id).map(|t| &t.payload)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id).children.get(index).copied()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.child(parent, index + 1)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index.checked_sub(1).and_then(|i| self.child(parent, i))
    }

    /// Ancestors from the parent up to the top
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            out.push(node);
            current = self.parent(node);
        }
        out
    }

    /// Whether `ancestor` is a strict ancestor of `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// The furthest ancestor, or `id` itself when detached
    pub fn top(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    // Node creation

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    /// A detached, childless token of `kind`
    pub fn create_token(&mut self, kind: TokenKind) -> NodeId {
        self.create_token_with(TokenData::new(kind))
    }

    /// A detached token; its acceptance table and protected positions come
    /// from its kind
    pub fn create_token_with(&mut self, mut data: TokenData) -> NodeId {
        data.acceptable = acceptable_for(data.kind);
        data.protected = protected_for(data.kind);
        self.alloc(NodeKind::Token(data))
    }

    // Unchecked construction, used while parsing and building

    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Replace the children of `parent` wholesale
    pub(crate) fn replace_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        for &old in &self.node(parent).children.clone() {
            if self.node(old).parent == Some(parent) {
                self.node_mut(old).parent = None;
            }
        }
        for &child in &children {
            self.node_mut(child).parent = Some(parent);
        }
        self.node_mut(parent).children = children;
        self.node_mut(parent).cache.take();
    }

    pub(crate) fn set_text_raw(&mut self, id: NodeId, text: String) {
        if let NodeKind::Text(content) = &mut self.node_mut(id).kind {
            *content = text;
        }
    }

    // Checked mutation

    fn check_layout(&self, parent: NodeId, layout: &[NodeId]) -> Result<(), TreeError> {
        let token = self.token(parent).ok_or(TreeError::NotAToken(parent))?;
        let Some(table) = token.acceptable() else {
            return Ok(());
        };
        let kinds: Vec<ChildKind> = layout.iter().map(|&c| self.child_kind(c)).collect();
        match table.first_violation(&kinds) {
            Some(index) => Err(TreeError::NotAccepted {
                parent: token.kind,
                child: kinds[index],
                index,
            }),
            None => Ok(()),
        }
    }

    fn check_protected(&self, parent: NodeId, index: usize) -> Result<(), TreeError> {
        let token = self.token(parent).ok_or(TreeError::NotAToken(parent))?;
        if token.protected.contains(index, self.child_count(parent)) {
            return Err(TreeError::Protected {
                parent: token.kind,
                index,
            });
        }
        Ok(())
    }

    /// Whether `child` can leave its current parent
    fn check_detach(&self, child: NodeId) -> Result<(), TreeError> {
        let (Some(parent), Some(index)) = (self.parent(child), self.index_in_parent(child)) else {
            return Ok(());
        };
        self.check_protected(parent, index)?;
        let mut remaining = self.children(parent).to_vec();
        remaining.remove(index);
        self.check_layout(parent, &remaining)
    }

    fn check_cycle(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if parent == child || self.is_ancestor(child, parent) {
            return Err(TreeError::Cycle { parent, child });
        }
        Ok(())
    }

    /// Insert `child` at `index` (negative counts from the end), moving it out
    /// of its current parent first
    pub fn insert_at(&mut self, parent: NodeId, child: NodeId, index: isize) -> Result<(), TreeError> {
        if self.token(parent).is_none() {
            return Err(TreeError::NotAToken(parent));
        }
        self.check_cycle(parent, child)?;
        let old_parent = self.parent(child);
        let old_index = self.index_in_parent(child);

        let mut layout: Vec<NodeId> = self
            .children(parent)
            .iter()
            .copied()
            .filter(|&c| c != child)
            .collect();
        let position = resolve_insert(index, layout.len())?;
        layout.insert(position, child);

        if !self.trusted {
            if let (Some(from), Some(from_index)) = (old_parent, old_index) {
                if from == parent {
                    self.check_protected(from, from_index)?;
                } else {
                    self.check_detach(child)?;
                }
            }
            self.check_layout(parent, &layout)?;
        }

        if let Some(from) = old_parent.filter(|&from| from != parent) {
            self.node_mut(from).children.retain(|&c| c != child);
            self.touch(from);
            self.emit(
                EventType::Remove,
                from,
                EventData {
                    position: old_index,
                    node: Some(child),
                    ..EventData::default()
                },
            );
        }
        self.node_mut(parent).children = layout;
        self.node_mut(child).parent = Some(parent);
        self.touch(parent);
        self.emit(
            EventType::Insert,
            parent,
            EventData {
                position: Some(position),
                node: Some(child),
                ..EventData::default()
            },
        );
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let len = self
            .children(parent)
            .iter()
            .filter(|&&c| c != child)
            .count();
        self.insert_at(parent, child, len as isize)
    }

    /// Remove and return the child at `index` (negative counts from the end)
    pub fn remove_at(&mut self, parent: NodeId, index: isize) -> Result<NodeId, TreeError> {
        if self.token(parent).is_none() {
            return Err(TreeError::NotAToken(parent));
        }
        let position = resolve_existing(index, self.child_count(parent))?;
        let child = self.children(parent)[position];
        if !self.trusted {
            self.check_detach(child)?;
        }

        self.node_mut(parent).children.remove(position);
        self.node_mut(child).parent = None;
        self.touch(parent);
        self.emit(
            EventType::Remove,
            parent,
            EventData {
                position: Some(position),
                node: Some(child),
                ..EventData::default()
            },
        );
        Ok(child)
    }

    /// Detach `id` from its parent; a no-op for a detached node
    pub fn detach(&mut self, id: NodeId) -> Result<(), TreeError> {
        match (self.parent(id), self.index_in_parent(id)) {
            (Some(parent), Some(index)) => self.remove_at(parent, index as isize).map(|_| ()),
            _ => Ok(()),
        }
    }

    /// Put `replacement` where the child at `index` is and return the old child
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        index: isize,
        replacement: NodeId,
    ) -> Result<NodeId, TreeError> {
        if self.token(parent).is_none() {
            return Err(TreeError::NotAToken(parent));
        }
        let position = resolve_existing(index, self.child_count(parent))?;
        let old = self.children(parent)[position];
        if old == replacement {
            return Ok(old);
        }
        self.check_cycle(parent, replacement)?;
        let from = self.parent(replacement);

        let mut layout = self.children(parent).to_vec();
        layout[position] = replacement;
        if from == Some(parent) {
            if let Some(i) = layout
                .iter()
                .enumerate()
                .position(|(i, &c)| c == replacement && i != position)
            {
                layout.remove(i);
            }
        }

        if !self.trusted {
            match from {
                Some(from) if from == parent => {
                    if let Some(i) = self.index_in_parent(replacement) {
                        self.check_protected(parent, i)?;
                    }
                }
                Some(_) => self.check_detach(replacement)?,
                None => {}
            }
            self.check_layout(parent, &layout)?;
        }

        if let Some(from) = from.filter(|&from| from != parent) {
            self.node_mut(from).children.retain(|&c| c != replacement);
            self.touch(from);
        }
        self.node_mut(old).parent = None;
        self.node_mut(replacement).parent = Some(parent);
        self.node_mut(parent).children = layout;
        self.touch(parent);
        self.emit(
            EventType::Replace,
            parent,
            EventData {
                position: Some(position),
                node: Some(replacement),
                old_node: Some(old),
                ..EventData::default()
            },
        );
        Ok(old)
    }

    /// Change the content of a text node
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), TreeError> {
        let text = text.into();
        let old = match &mut self.node_mut(id).kind {
            NodeKind::Text(content) => std::mem::replace(content, text),
            NodeKind::Token(_) => return Err(TreeError::NotText(id)),
        };
        if let Some(parent) = self.parent(id) {
            self.touch(parent);
        }
        self.emit(
            EventType::Text,
            id,
            EventData {
                node: Some(id),
                old_text: Some(old),
                ..EventData::default()
            },
        );
        Ok(())
    }

    /// Drop cached serializations of `id` and its ancestors and, once built,
    /// recompute their derived attributes
    pub(crate) fn touch(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node) = current {
            self.node_mut(node).cache.take();
            current = self.parent(node);
        }
        if self.built {
            let mut current = Some(id);
            while let Some(node) = current {
                self.refresh_derived(node);
                current = self.parent(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Tree {
        Tree::new(Config::shared_default())
    }

    #[test]
    fn test_new_tree_has_empty_root() {
        let tree = tree();
        let root = tree.root();
        assert_eq!(tree.type_name(root), "root");
        assert_eq!(tree.child_count(root), 0);
        assert!(tree.is_built());
    }

    #[test]
    fn test_trusted_guard_restores_mode() {
        let mut tree = tree();
        {
            let mut guard = tree.trusted();
            assert!(guard.is_trusted());
            {
                let nested = guard.trusted();
                assert!(nested.is_trusted());
            }
            assert!(guard.is_trusted());
        }
        assert!(!tree.is_trusted());
    }

    #[test]
    fn test_insert_rejects_cycles() {
        let mut tree = tree();
        let outer = tree.create_token(TokenKind::Plain);
        let inner = tree.create_token(TokenKind::Plain);
        tree.append_child(outer, inner).unwrap();
        assert_eq!(
            tree.append_child(inner, outer),
            Err(TreeError::Cycle {
                parent: inner,
                child: outer
            })
        );
    }

    #[test]
    fn test_negative_insert_index() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        tree.append_child(root, a).unwrap();
        tree.insert_at(root, b, -1).unwrap();
        assert_eq!(tree.children(root), &[b, a]);
        let c = tree.create_text("c");
        assert!(matches!(
            tree.insert_at(root, c, 9),
            Err(TreeError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_move_between_parents() {
        let mut tree = tree();
        let left = tree.create_token(TokenKind::Plain);
        let right = tree.create_token(TokenKind::Plain);
        let text = tree.create_text("x");
        tree.append_child(left, text).unwrap();
        tree.append_child(right, text).unwrap();
        assert!(tree.children(left).is_empty());
        assert_eq!(tree.parent(text), Some(right));
    }

    #[test]
    fn test_set_text_requires_text_node() {
        let mut tree = tree();
        let root = tree.root();
        assert_eq!(tree.set_text(root, "x"), Err(TreeError::NotText(root)));
    }
}
