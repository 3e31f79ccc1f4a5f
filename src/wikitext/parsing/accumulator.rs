//! Per-parse registry of constructed tokens
//!
//! Tokens are registered in construction order. A token's position here is
//! fixed when it is pushed and is the index its sentinel carries.

use crate::wikitext::ast::NodeId;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Accumulator {
    tokens: Vec<NodeId>,
    positions: HashMap<NodeId, usize>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id`; returns its sentinel index
    pub fn push(&mut self, id: NodeId) -> usize {
        let index = self.tokens.len();
        self.tokens.push(id);
        self.positions.insert(id, index);
        index
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.tokens.get(index).copied()
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tokens.iter().copied()
    }
}
