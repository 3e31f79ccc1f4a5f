//! Normalized, serializable view of a (sub)tree
//!
//! Output formats consume a [`NodeSnapshot`] rather than walking the arena
//! themselves. Attributes are kept in a `BTreeMap` so serialized output is
//! stable.

use super::node::{NodeId, NodeKind, Payload};
use super::tree::Tree;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// `"text"` or the token's type tag
    pub node_type: String,
    /// Text content for text nodes, the derived name for tokens
    pub label: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn new(node_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            label: label.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }
}

fn payload_attributes(mut snapshot: NodeSnapshot, payload: &Payload) -> NodeSnapshot {
    match payload {
        Payload::None => snapshot,
        Payload::Comment { closed } => snapshot.with_attribute("closed", closed),
        Payload::Ext {
            self_closing,
            closing,
            ..
        } => {
            snapshot = snapshot.with_attribute("selfClosing", self_closing);
            if !*self_closing && closing.is_empty() {
                snapshot = snapshot.with_attribute("closed", false);
            }
            snapshot
        }
        Payload::Html {
            closing,
            self_closing,
            ..
        } => snapshot
            .with_attribute("closing", closing)
            .with_attribute("selfClosing", self_closing),
        Payload::Attribute { quote, closed, .. } => match quote {
            Some(q) => snapshot
                .with_attribute("quote", q)
                .with_attribute("closed", closed),
            None => snapshot,
        },
        Payload::Parameter { anonymous } => snapshot.with_attribute("anonymous", anonymous),
        Payload::MagicWord { colon } => snapshot.with_attribute("colon", colon),
        Payload::Td { .. } => snapshot,
        Payload::Heading { level } => snapshot.with_attribute("level", level),
        Payload::Quote { bold, italic } => snapshot
            .with_attribute("bold", bold)
            .with_attribute("italic", italic),
        Payload::ExtLink { .. } => snapshot,
        Payload::Converter { has_flags } => snapshot.with_attribute("flags", has_flags),
        Payload::ConverterRule { arrow, .. } => snapshot.with_attribute("unidirectional", arrow),
    }
}

impl Tree {
    pub fn snapshot(&self, id: NodeId) -> NodeSnapshot {
        match self.kind(id) {
            NodeKind::Text(text) => NodeSnapshot::new("text", text.clone()),
            NodeKind::Token(token) => {
                let snapshot = NodeSnapshot::new(
                    token.kind.type_name(),
                    token.name.clone().unwrap_or_default(),
                );
                let mut snapshot = payload_attributes(snapshot, &token.payload);
                snapshot.children = self
                    .children(id)
                    .iter()
                    .map(|&child| self.snapshot(child))
                    .collect();
                snapshot
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_without_empty_fields() {
        let snapshot = NodeSnapshot::new("text", "hi");
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"node_type":"text","label":"hi"}"#);
    }
}
