//! Syntax tree of a wikitext document
//!
//! The tree is an arena: [`Tree`] owns every node and hands out [`NodeId`]s.
//! A node is either text or a token. Tokens carry a closed [`TokenKind`],
//! an optional derived name, kind-specific [`Payload`] and an ordered list of
//! children. Serializing the root always reproduces the parsed input.
//!
//! Mutation is checked against per-kind acceptance tables (see
//! [`acceptance`]) unless the tree is in trusted mode.

pub mod acceptance;
mod attributes;
mod derived;
pub mod error;
pub mod events;
pub mod kind;
pub mod node;
pub mod range;
mod query;
mod render;
pub mod snapshot;
pub mod title;
pub mod tree;

pub use acceptance::Acceptable;
pub use error::TreeError;
pub use events::{Event, EventData, EventType, Listener};
pub use kind::{ChildKind, TokenKind};
pub use node::{NodeId, NodeKind, Payload, TokenData};
pub use range::{Position, Range, SourceLocation};
pub use snapshot::NodeSnapshot;
pub use title::normalize_title;
pub use tree::{Tree, Trusted};
