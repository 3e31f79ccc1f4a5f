//! Stage 6: `''italic''` and `'''bold'''` apostrophe runs
//!
//! Runs are normalized per line the way MediaWiki does: four apostrophes are
//! a literal one plus bold, more than five are literals plus bold italic.
//! When a line ends up with both an odd number of italic and of bold runs,
//! one bold run is demoted to an apostrophe plus italic, preferring a run
//! after a one-letter word, then one after a longer word, then one after a
//! space.

use super::{lines_with_offsets, Recognizer};
use crate::wikitext::ast::{Payload, TokenKind};
use crate::wikitext::parsing::context::BuildContext;
use crate::wikitext::parsing::sentinel::SentinelKind;
use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) struct Quotes;

static RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"''+").unwrap());

/// Literal text followed by a run length; the last piece has length 0
#[derive(Debug, PartialEq, Eq)]
struct Piece {
    text: String,
    run: usize,
}

fn split_runs(line: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut cursor = 0;
    for run in RUN.find_iter(line) {
        let mut text = line[cursor..run.start()].to_string();
        let mut len = run.len();
        if len == 4 {
            text.push('\'');
            len = 3;
        } else if len > 5 {
            text.push_str(&"'".repeat(len - 5));
            len = 5;
        }
        pieces.push(Piece { text, run: len });
        cursor = run.end();
    }
    pieces.push(Piece {
        text: line[cursor..].to_string(),
        run: 0,
    });
    pieces
}

fn balance(pieces: &mut [Piece]) {
    let italics = pieces.iter().filter(|p| p.run == 2 || p.run == 5).count();
    let bolds = pieces.iter().filter(|p| p.run == 3 || p.run == 5).count();
    if italics % 2 == 0 || bolds % 2 == 0 {
        return;
    }

    let mut single_letter = None;
    let mut multi_letter = None;
    let mut space = None;
    for (i, piece) in pieces.iter().enumerate().filter(|(_, p)| p.run == 3) {
        let mut chars = piece.text.chars().rev();
        let x1 = chars.next();
        let x2 = chars.next().or(x1);
        if x1 == Some(' ') {
            space.get_or_insert(i);
        } else if x2 == Some(' ') {
            single_letter = Some(i);
            break;
        } else {
            multi_letter.get_or_insert(i);
        }
    }
    if let Some(i) = single_letter.or(multi_letter).or(space) {
        pieces[i].text.push('\'');
        pieces[i].run = 2;
    }
}

impl Recognizer for Quotes {
    fn name(&self) -> &'static str {
        "quotes"
    }

    fn recognize(&self, text: &str, ctx: &mut BuildContext<'_>) -> String {
        if !text.contains("''") {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        for (offset, line) in lines_with_offsets(text) {
            if offset > 0 {
                out.push('\n');
            }
            let mut pieces = split_runs(line);
            balance(&mut pieces);
            for piece in pieces {
                out.push_str(&piece.text);
                if piece.run == 0 {
                    continue;
                }
                let quote = ctx.atom(TokenKind::Quote, &"'".repeat(piece.run));
                if let Some(token) = ctx.tree.token_mut(quote) {
                    token.payload = Payload::Quote {
                        bold: piece.run >= 3,
                        italic: piece.run != 3,
                    };
                }
                out.push_str(&ctx.sentinel(quote, SentinelKind::Quote));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(line: &str) -> Vec<usize> {
        let mut pieces = split_runs(line);
        balance(&mut pieces);
        pieces.iter().map(|p| p.run).filter(|&r| r > 0).collect()
    }

    #[test]
    fn normalizes_long_runs() {
        let pieces = split_runs("a''''b'''''''c");
        assert_eq!(pieces[0], Piece { text: "a'".into(), run: 3 });
        assert_eq!(pieces[1], Piece { text: "b''".into(), run: 5 });
    }

    #[test]
    fn balanced_lines_are_untouched() {
        assert_eq!(runs("''a'' '''b'''"), vec![2, 2, 3, 3]);
    }

    #[test]
    fn odd_bold_after_single_letter_becomes_italic() {
        // l'''amour: the bold run after the one-letter word is the apostrophe
        assert_eq!(runs("''x l'''amour"), vec![2, 2]);
    }
}
