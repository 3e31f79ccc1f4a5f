//! Reading and writing tag attributes
//!
//! Extension tags, HTML tags, tables, rows and cells keep their attributes in
//! an `attributes` child: free text interleaved with `attribute` tokens. When
//! a key repeats, the last occurrence wins.

use super::error::TreeError;
use super::kind::TokenKind;
use super::node::{NodeId, Payload, TokenData};
use super::tree::Tree;

impl Tree {
    /// The `attributes` token of a tag-like node, or the node itself if it is one
    pub fn attributes_of(&self, id: NodeId) -> Option<NodeId> {
        if self.is_kind(id, TokenKind::Attributes) {
            return Some(id);
        }
        match self.token_kind(id)? {
            TokenKind::Ext | TokenKind::Html | TokenKind::Table | TokenKind::Tr | TokenKind::Td => self
                .children(id)
                .iter()
                .copied()
                .find(|&c| self.is_kind(c, TokenKind::Attributes)),
            _ => None,
        }
    }

    fn find_attribute(&self, id: NodeId, key: &str) -> Option<NodeId> {
        let attrs = self.attributes_of(id)?;
        let key = key.trim().to_lowercase();
        self.children(attrs)
            .iter()
            .rev()
            .copied()
            .find(|&c| self.is_kind(c, TokenKind::Attribute) && self.attribute_key(c) == key)
    }

    fn attribute_key(&self, attr: NodeId) -> String {
        match self.payload(attr) {
            Some(Payload::Attribute { key, .. }) => key.trim().to_lowercase(),
            _ => String::new(),
        }
    }

    /// Value of attribute `key`; an empty string for a bare key
    pub fn get_attr(&self, id: NodeId, key: &str) -> Option<String> {
        let attr = self.find_attribute(id, key)?;
        Some(
            self.child(attr, 0)
                .map(|value| self.to_string(value))
                .unwrap_or_default(),
        )
    }

    pub fn has_attr(&self, id: NodeId, key: &str) -> bool {
        self.find_attribute(id, key).is_some()
    }

    /// Lowercased keys in source order, without repeats
    pub fn attr_names(&self, id: NodeId) -> Vec<String> {
        let Some(attrs) = self.attributes_of(id) else {
            return Vec::new();
        };
        let mut names: Vec<String> = Vec::new();
        for &child in self.children(attrs) {
            if self.is_kind(child, TokenKind::Attribute) {
                let key = self.attribute_key(child);
                if !names.contains(&key) {
                    names.push(key);
                }
            }
        }
        names
    }

    /// Set attribute `key`, rewriting the last occurrence or appending a new one
    pub fn set_attr(&mut self, id: NodeId, key: &str, value: &str) -> Result<(), TreeError> {
        let attrs = self.attributes_of(id).ok_or(TreeError::NotAToken(id))?;
        let quote = if value.contains('"') { '\'' } else { '"' };

        let attr = match self.find_attribute(id, key) {
            Some(attr) => attr,
            None => {
                let attr = self.create_token_with(TokenData::new(TokenKind::Attribute).with_payload(
                    Payload::Attribute {
                        key: key.trim().to_string(),
                        equal: "=".to_string(),
                        quote: Some(quote),
                        closed: true,
                    },
                ));
                let value_token = self.create_token(TokenKind::AttrValue);
                self.append_child(attr, value_token)?;
                let space = self.create_text(" ");
                self.append_child(attrs, space)?;
                self.append_child(attrs, attr)?;
                attr
            }
        };

        if let Some(token) = self.token_mut(attr) {
            if let Payload::Attribute {
                equal,
                quote: current,
                closed,
                ..
            } = &mut token.payload
            {
                if equal.is_empty() {
                    *equal = "=".to_string();
                }
                if current.is_none() || (*current == Some('"') && value.contains('"')) {
                    *current = Some(quote);
                }
                *closed = true;
            }
        }

        let value_token = match self.child(attr, 0) {
            Some(value_token) => value_token,
            None => {
                let value_token = self.create_token(TokenKind::AttrValue);
                self.append_child(attr, value_token)?;
                value_token
            }
        };
        while self.child_count(value_token) > 0 {
            self.remove_at(value_token, -1)?;
        }
        let text = self.create_text(value);
        self.append_child(value_token, text)?;
        self.touch(attr);
        Ok(())
    }

    /// Remove every occurrence of attribute `key`; returns whether any existed
    pub fn remove_attr(&mut self, id: NodeId, key: &str) -> Result<bool, TreeError> {
        let mut removed = false;
        while let Some(attr) = self.find_attribute(id, key) {
            self.detach(attr)?;
            removed = true;
        }
        Ok(removed)
    }
}
