//! Errors raised by checked tree mutation

use super::kind::{ChildKind, TokenKind};
use super::node::NodeId;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The resulting child layout violates the parent's acceptance table
    NotAccepted {
        parent: TokenKind,
        child: ChildKind,
        index: usize,
    },
    /// The position is structurally fixed and cannot be removed
    Protected { parent: TokenKind, index: usize },
    IndexOutOfRange { index: isize, len: usize },
    /// The operation needs a token but got a text node
    NotAToken(NodeId),
    NotText(NodeId),
    /// A node cannot become its own descendant
    Cycle { parent: NodeId, child: NodeId },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::NotAccepted {
                parent,
                child,
                index,
            } => write!(
                f,
                "{} does not accept {} at position {}",
                parent, child, index
            ),
            TreeError::Protected { parent, index } => {
                write!(f, "Child {} of {} is protected", index, parent)
            }
            TreeError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} out of range for {} children", index, len)
            }
            TreeError::NotAToken(id) => write!(f, "Node {} is not a token", id),
            TreeError::NotText(id) => write!(f, "Node {} is not a text node", id),
            TreeError::Cycle { parent, child } => {
                write!(f, "Cannot insert {} into its descendant {}", child, parent)
            }
        }
    }
}

impl std::error::Error for TreeError {}
