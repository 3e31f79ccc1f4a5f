//! Arena node storage
//!
//! Nodes live in a `Vec` owned by [`Tree`](super::Tree) and refer to each
//! other by [`NodeId`]. A parent owns the ordered list of its children; the
//! back-reference to the parent is a plain index and never keeps anything
//! alive.

use super::acceptance::Acceptable;
use super::events::{EventType, Listener};
use super::kind::{ChildKind, TokenKind};
use crate::wikitext::ranges::RangeSet;
use once_cell::unsync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// Index of a node inside its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-kind data that shapes serialization
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    #[default]
    None,
    Comment {
        closed: bool,
    },
    Ext {
        raw_name: String,
        self_closing: bool,
        /// Closing tag as written, empty when self-closing
        closing: String,
    },
    Html {
        raw_name: String,
        closing: bool,
        self_closing: bool,
    },
    Attribute {
        key: String,
        /// `=` with any surrounding whitespace, empty for a bare key
        equal: String,
        quote: Option<char>,
        closed: bool,
    },
    Parameter {
        anonymous: bool,
    },
    MagicWord {
        /// `{{name:arg}}` rather than `{{name|arg}}`
        colon: bool,
    },
    Td {
        /// A `|` separates cell attributes from content
        attr_separator: bool,
    },
    Heading {
        level: usize,
    },
    Quote {
        bold: bool,
        italic: bool,
    },
    ExtLink {
        space: String,
    },
    Converter {
        has_flags: bool,
    },
    ConverterRule {
        arrow: bool,
        colon: bool,
    },
}

/// A token: a typed node with an ordered list of children
#[derive(Debug, Clone)]
pub struct TokenData {
    pub kind: TokenKind,
    /// Derived after build: normalized title, parameter key, heading level…
    pub name: Option<String>,
    /// Next stage to apply; `None` once built or for non-container tokens
    pub stage: Option<u8>,
    pub payload: Payload,
    pub(crate) acceptable: Option<Arc<Acceptable>>,
    pub(crate) protected: RangeSet,
}

impl TokenData {
    pub fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            name: None,
            stage: None,
            payload: Payload::None,
            acceptable: None,
            protected: RangeSet::new(),
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn acceptable(&self) -> Option<&Acceptable> {
        self.acceptable.as_deref()
    }

    pub fn protected(&self) -> &RangeSet {
        &self.protected
    }
}

/// Node content
#[derive(Debug, Clone)]
pub enum NodeKind {
    Text(String),
    Token(TokenData),
}

impl NodeKind {
    pub fn child_kind(&self) -> ChildKind {
        match self {
            NodeKind::Text(_) => ChildKind::Text,
            NodeKind::Token(t) => ChildKind::Token(t.kind),
        }
    }
}

pub(crate) struct NodeData {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
    /// Serialized form, only filled once the tree is built
    pub(crate) cache: OnceCell<String>,
    pub(crate) listeners: Vec<(EventType, Listener)>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            kind,
            cache: OnceCell::new(),
            listeners: Vec::new(),
        }
    }
}

impl fmt::Debug for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeData")
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("kind", &self.kind)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
