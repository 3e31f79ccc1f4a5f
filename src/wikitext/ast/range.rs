//! Source positions of nodes
//!
//! Nodes never store their location. It is derived on demand from the
//! serialized tree: a node's byte offset is the sum of everything rendered
//! before it, so positions stay correct across arbitrary mutation.
//!
//! - [`Position`] - a zero-based line:column pair, columns count bytes
//! - [`Range`] - a byte span together with its start and end positions
//! - [`SourceLocation`] - byte offset to position conversion for one text

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range as ByteRange;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Location of a node in the serialized text of its tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    pub span: ByteRange<usize>,
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(span: ByteRange<usize>, start: Position, end: Position) -> Self {
        Self { span, start, end }
    }

    /// Whether a byte offset falls inside the span (end exclusive)
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.span.contains(&offset)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Byte offset to line/column conversion
pub struct SourceLocation {
    line_starts: Vec<usize>,
}

impl SourceLocation {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }
        Self { line_starts }
    }

    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);
        Position::new(line, byte_offset - self.line_starts[line])
    }

    pub fn span_to_range(&self, span: ByteRange<usize>) -> Range {
        let start = self.byte_to_position(span.start);
        let end = self.byte_to_position(span.end);
        Range::new(span, start, end)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
    }

    #[test]
    fn test_byte_to_position() {
        let loc = SourceLocation::new("ab\ncd\n\nef");
        assert_eq!(loc.byte_to_position(0), Position::new(0, 0));
        assert_eq!(loc.byte_to_position(2), Position::new(0, 2));
        assert_eq!(loc.byte_to_position(3), Position::new(1, 0));
        assert_eq!(loc.byte_to_position(6), Position::new(2, 0));
        assert_eq!(loc.byte_to_position(8), Position::new(3, 1));
        assert_eq!(loc.line_count(), 4);
    }

    #[test]
    fn test_multibyte_columns_count_bytes() {
        let loc = SourceLocation::new("é\nx");
        assert_eq!(loc.byte_to_position(2), Position::new(0, 2));
        assert_eq!(loc.byte_to_position(3), Position::new(1, 0));
    }

    #[test]
    fn test_range_contains() {
        let loc = SourceLocation::new("one\ntwo");
        let range = loc.span_to_range(2..5);
        assert_eq!(range.start, Position::new(0, 2));
        assert_eq!(range.end, Position::new(1, 1));
        assert!(range.contains(Position::new(1, 0)));
        assert!(!range.contains(Position::new(1, 2)));
        assert!(range.contains_offset(4));
        assert!(!range.contains_offset(5));
        assert_eq!(range.to_string(), "0:2..1:1");
    }
}
