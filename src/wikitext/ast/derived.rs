//! Attributes derived from a token's children
//!
//! Names are a function of the subtree: a template's normalized title, the
//! position of an anonymous parameter, a heading's level. They are computed
//! once the tree is built and recomputed on the path to the root after every
//! checked mutation.

use super::kind::TokenKind;
use super::node::{NodeId, Payload};
use super::title::normalize_title;
use super::tree::Tree;
use std::sync::Arc;

impl Tree {
    /// Trimmed text of child `index` with comments left out
    fn child_text(&self, id: NodeId, index: usize) -> Option<String> {
        self.child(id, index)
            .map(|child| self.text_without_comments(child).trim().to_string())
    }

    pub(crate) fn refresh_derived(&mut self, id: NodeId) {
        let Some(kind) = self.token_kind(id) else {
            return;
        };
        let config = Arc::clone(self.config());
        let name = match kind {
            TokenKind::Template => {
                self.number_parameters(id);
                self.child_text(id, 0)
                    .map(|raw| normalize_title(&raw, 10, &config))
            }
            TokenKind::MagicWord => {
                self.number_parameters(id);
                self.child_text(id, 0)
                    .map(|raw| raw.trim_start_matches('#').to_lowercase())
            }
            TokenKind::Arg => self.child_text(id, 0),
            TokenKind::Parameter => match self.payload(id) {
                Some(Payload::Parameter { anonymous: false }) => self.child_text(id, 0),
                _ => return,
            },
            TokenKind::Link | TokenKind::FileLink | TokenKind::Category => self
                .child_text(id, 0)
                .map(|raw| normalize_title(&raw, 0, &config)),
            TokenKind::Heading => match self.payload(id) {
                Some(Payload::Heading { level }) => Some(level.to_string()),
                _ => None,
            },
            TokenKind::Attribute => match self.payload(id) {
                Some(Payload::Attribute { key, .. }) => Some(key.trim().to_lowercase()),
                _ => None,
            },
            TokenKind::Ext => match self.payload(id) {
                Some(Payload::Ext { raw_name, .. }) => Some(raw_name.to_lowercase()),
                _ => None,
            },
            TokenKind::Html => match self.payload(id) {
                Some(Payload::Html { raw_name, .. }) => Some(raw_name.to_lowercase()),
                _ => None,
            },
            _ => return,
        };
        if let Some(token) = self.token_mut(id) {
            token.name = name;
        }
    }

    /// Anonymous parameters are named by their 1-based position among the
    /// anonymous ones; named ones by their trimmed key
    fn number_parameters(&mut self, id: NodeId) {
        let mut position = 0;
        for param in self.children(id).to_vec() {
            let name = match self.payload(param) {
                Some(Payload::Parameter { anonymous: true }) => {
                    position += 1;
                    Some(position.to_string())
                }
                Some(Payload::Parameter { anonymous: false }) => self.child_text(param, 0),
                _ => continue,
            };
            if let Some(token) = self.token_mut(param) {
                token.name = name;
            }
        }
    }
}
