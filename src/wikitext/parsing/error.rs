//! Fatal pipeline errors

use crate::wikitext::ast::NodeId;
use crate::wikitext::config::Config;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A sentinel points past the end of the accumulator
    UnknownSentinel { index: String, accumulated: usize },
    /// A token is referenced by more than one sentinel
    DuplicateSentinel { index: usize },
    /// A sentinel's tag does not match the token it points to
    TagMismatch { index: usize, expected: char, found: char },
    /// Sentinel characters survived the build
    LeftoverSentinel { node: NodeId },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnknownSentinel { index, accumulated } => write!(
                f,
                "sentinel {} is outside the accumulator ({} tokens)",
                index, accumulated
            ),
            ParseErrorKind::DuplicateSentinel { index } => {
                write!(f, "token {} is referenced twice", index)
            }
            ParseErrorKind::TagMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "sentinel {} is tagged '{}' but its token expects '{}'",
                index, found, expected
            ),
            ParseErrorKind::LeftoverSentinel { node } => {
                write!(f, "unresolved sentinel left in {}", node)
            }
        }
    }
}

/// Pipeline invariant violation, with what is needed to reproduce it
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Stage the root had reached
    pub stage: u8,
    /// Pending text of the offending node
    pub text: String,
    pub config: Arc<Config>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse failed after stage {}: {}", self.stage, self.kind)
    }
}

impl std::error::Error for ParseError {}
