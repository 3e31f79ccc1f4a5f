//! Placeholder markers spliced into pending text
//!
//! A recognized construct is replaced by `\0{index}{tag}\x7F`, where `index`
//! points into the accumulator and `tag` is one character naming the family.
//! Input text never contains `\0` or `\x7F` (they are stripped before
//! parsing), so every occurrence of `\0` starts a well-formed marker.

use crate::wikitext::ast::TokenKind;
use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) static SENTINEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x00(\d+)([a-z!])\x7F").unwrap());

/// Closed one-character alphabet of marker tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentinelKind {
    /// Comments and inclusion markup
    Comment,
    Ext,
    /// Templates, arguments and parser functions
    Template,
    /// `{{!}}`
    Escape,
    Html,
    Table,
    Hr,
    DoubleUnderscore,
    Heading,
    Link,
    Quote,
    /// External, free and magic links
    ExtLink,
    /// List markers and definition colons
    List,
    Converter,
}

impl SentinelKind {
    pub fn tag(self) -> char {
        match self {
            SentinelKind::Comment => 'c',
            SentinelKind::Ext => 'e',
            SentinelKind::Template => 't',
            SentinelKind::Escape => '!',
            SentinelKind::Html => 'x',
            SentinelKind::Table => 'b',
            SentinelKind::Hr => 'r',
            SentinelKind::DoubleUnderscore => 'n',
            SentinelKind::Heading => 'h',
            SentinelKind::Link => 'l',
            SentinelKind::Quote => 'q',
            SentinelKind::ExtLink => 'w',
            SentinelKind::List => 'i',
            SentinelKind::Converter => 'v',
        }
    }

    pub fn from_tag(tag: char) -> Option<Self> {
        Some(match tag {
            'c' => SentinelKind::Comment,
            'e' => SentinelKind::Ext,
            't' => SentinelKind::Template,
            '!' => SentinelKind::Escape,
            'x' => SentinelKind::Html,
            'b' => SentinelKind::Table,
            'r' => SentinelKind::Hr,
            'n' => SentinelKind::DoubleUnderscore,
            'h' => SentinelKind::Heading,
            'l' => SentinelKind::Link,
            'q' => SentinelKind::Quote,
            'w' => SentinelKind::ExtLink,
            'i' => SentinelKind::List,
            'v' => SentinelKind::Converter,
            _ => return None,
        })
    }

    /// The tag a token of `kind` is referenced by, if it can stand in text
    pub fn for_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Comment | TokenKind::Include => SentinelKind::Comment,
            TokenKind::Ext => SentinelKind::Ext,
            TokenKind::Template | TokenKind::Arg | TokenKind::MagicWord => SentinelKind::Template,
            TokenKind::Escape => SentinelKind::Escape,
            TokenKind::Html => SentinelKind::Html,
            TokenKind::Table => SentinelKind::Table,
            TokenKind::Hr => SentinelKind::Hr,
            TokenKind::DoubleUnderscore => SentinelKind::DoubleUnderscore,
            TokenKind::Heading => SentinelKind::Heading,
            TokenKind::Link | TokenKind::FileLink | TokenKind::Category => SentinelKind::Link,
            TokenKind::Quote => SentinelKind::Quote,
            TokenKind::ExtLink | TokenKind::MagicLink => SentinelKind::ExtLink,
            TokenKind::ListMarker | TokenKind::Dd => SentinelKind::List,
            TokenKind::Converter => SentinelKind::Converter,
            _ => return None,
        })
    }
}

pub(crate) fn encode(index: usize, kind: SentinelKind) -> String {
    format!("\0{}{}\x7F", index, kind.tag())
}

/// A piece of sentinel-bearing text
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece<'a> {
    Literal(&'a str),
    Marker { digits: &'a str, tag: char },
}

pub(crate) fn split(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut cursor = 0;
    for caps in SENTINEL.captures_iter(text) {
        let (Some(whole), Some(digits), Some(tag)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if whole.start() > cursor {
            pieces.push(Piece::Literal(&text[cursor..whole.start()]));
        }
        pieces.push(Piece::Marker {
            digits: digits.as_str(),
            tag: tag.as_str().chars().next().unwrap_or('\0'),
        });
        cursor = whole.end();
    }
    if cursor < text.len() {
        pieces.push(Piece::Literal(&text[cursor..]));
    }
    pieces
}

/// Whether `text` carries a marker of any kind outside `allowed`
pub(crate) fn has_marker_except(text: &str, allowed: &[SentinelKind]) -> bool {
    SENTINEL.captures_iter(text).any(|caps| {
        caps.get(2)
            .and_then(|tag| tag.as_str().chars().next())
            .and_then(SentinelKind::from_tag)
            .map_or(true, |kind| !allowed.contains(&kind))
    })
}

pub(crate) fn has_marker(text: &str, kind: SentinelKind) -> bool {
    SENTINEL.captures_iter(text).any(|caps| {
        caps.get(2)
            .and_then(|tag| tag.as_str().chars().next())
            == Some(kind.tag())
    })
}

/// `text` with every marker of `kind` removed
pub(crate) fn strip_kind(text: &str, kind: SentinelKind) -> String {
    SENTINEL
        .replace_all(text, |caps: &regex::Captures<'_>| {
            if caps.get(2).map(|m| m.as_str()) == Some(kind.tag().to_string().as_str()) {
                String::new()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_and_splits() {
        let text = format!("a{}b{}", encode(3, SentinelKind::Template), encode(12, SentinelKind::Escape));
        assert_eq!(
            split(&text),
            vec![
                Piece::Literal("a"),
                Piece::Marker { digits: "3", tag: 't' },
                Piece::Literal("b"),
                Piece::Marker { digits: "12", tag: '!' },
            ]
        );
    }

    #[test]
    fn tags_are_unique() {
        let kinds = [
            SentinelKind::Comment,
            SentinelKind::Ext,
            SentinelKind::Template,
            SentinelKind::Escape,
            SentinelKind::Html,
            SentinelKind::Table,
            SentinelKind::Hr,
            SentinelKind::DoubleUnderscore,
            SentinelKind::Heading,
            SentinelKind::Link,
            SentinelKind::Quote,
            SentinelKind::ExtLink,
            SentinelKind::List,
            SentinelKind::Converter,
        ];
        for kind in kinds {
            assert_eq!(SentinelKind::from_tag(kind.tag()), Some(kind));
        }
        let mut tags: Vec<char> = kinds.iter().map(|k| k.tag()).collect();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), kinds.len());
    }

    #[test]
    fn filters_by_kind() {
        let text = format!("x{}y", encode(0, SentinelKind::Comment));
        assert!(has_marker(&text, SentinelKind::Comment));
        assert!(!has_marker_except(&text, &[SentinelKind::Comment]));
        assert!(has_marker_except(&text, &[SentinelKind::Template]));
        assert_eq!(strip_kind(&text, SentinelKind::Comment), "xy");
    }
}
