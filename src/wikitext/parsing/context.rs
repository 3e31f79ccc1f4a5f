//! Construction context threaded through every recognizer
//!
//! Holds the tree (already in trusted mode), the accumulator, the shared
//! configuration and the stage being applied. Recognizers create tokens only
//! through it, which keeps "push on construction" and sentinel numbering in
//! one place.

use super::accumulator::Accumulator;
use super::engine;
use super::sentinel::{self, SentinelKind};
use crate::wikitext::ast::{NodeId, Payload, TokenData, TokenKind, Tree};
use crate::wikitext::config::Config;
use std::sync::Arc;
use tracing::trace;

pub struct BuildContext<'p> {
    pub(crate) tree: &'p mut Tree,
    pub(crate) accum: &'p mut Accumulator,
    pub(crate) config: Arc<Config>,
    pub(crate) include: bool,
    pub(crate) stage: u8,
    /// Kind of the container whose text is being rewritten
    pub(crate) owner: TokenKind,
}

impl<'p> BuildContext<'p> {
    pub(crate) fn new(tree: &'p mut Tree, accum: &'p mut Accumulator, include: bool) -> Self {
        let config = Arc::clone(tree.config());
        Self {
            tree,
            accum,
            config,
            include,
            stage: 0,
            owner: TokenKind::Root,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn include(&self) -> bool {
        self.include
    }

    pub fn stage(&self) -> u8 {
        self.stage
    }

    pub fn owner(&self) -> TokenKind {
        self.owner
    }

    /// Whether the text being rewritten begins at the start of a line
    pub fn at_line_start(&self) -> bool {
        self.owner.starts_line()
    }

    /// Allocate a token and register it in the accumulator
    pub fn push(&mut self, data: TokenData) -> NodeId {
        let kind = data.kind;
        let id = self.tree.create_token_with(data);
        let index = self.accum.push(id);
        trace!(stage = self.stage, index, kind = kind.type_name(), "token constructed");
        id
    }

    pub fn token(&mut self, kind: TokenKind, payload: Payload) -> NodeId {
        self.push(TokenData::new(kind).with_payload(payload))
    }

    /// A token whose content is fixed text, resolved at build but never staged
    pub fn atom(&mut self, kind: TokenKind, text: &str) -> NodeId {
        let id = self.push(TokenData::new(kind));
        self.text(id, text);
        id
    }

    /// A generic container that later stages keep rewriting
    pub fn plain(&mut self, kind: TokenKind, text: &str) -> NodeId {
        let mut data = TokenData::new(kind);
        data.stage = Some(self.stage);
        let id = self.push(data);
        self.text(id, text);
        id
    }

    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.tree.attach(parent, child);
    }

    /// Append a text child
    pub fn text(&mut self, parent: NodeId, text: &str) {
        let child = self.tree.create_text(text);
        self.tree.attach(parent, child);
    }

    /// Marker standing for `id` in pending text
    pub fn sentinel(&self, id: NodeId, kind: SentinelKind) -> String {
        let index = self.accum.index_of(id).unwrap_or(usize::MAX);
        sentinel::encode(index, kind)
    }

    /// Apply stage 0 right away, for containers created while stage 0 runs
    pub fn parse_now(&mut self, id: NodeId) {
        let stage = self.stage;
        let owner = self.owner;
        engine::parse_once(self, id, 0);
        self.stage = stage;
        self.owner = owner;
    }
}
