//! Stage 9: list markers at line start and the `;term:definition` colon

use super::{lines_with_offsets, Recognizer};
use crate::wikitext::ast::TokenKind;
use crate::wikitext::parsing::context::BuildContext;
use crate::wikitext::parsing::sentinel::SentinelKind;
use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) struct Lists;

static MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A[*#:;]+").unwrap());

impl Recognizer for Lists {
    fn name(&self) -> &'static str {
        "lists"
    }

    fn recognize(&self, text: &str, ctx: &mut BuildContext<'_>) -> String {
        let first_at_line_start = ctx.at_line_start();
        let mut out = String::with_capacity(text.len());
        for (offset, line) in lines_with_offsets(text) {
            if offset > 0 {
                out.push('\n');
            } else if !first_at_line_start {
                out.push_str(line);
                continue;
            }
            let Some(marker) = MARKER.find(line) else {
                out.push_str(line);
                continue;
            };

            let list = ctx.atom(TokenKind::ListMarker, marker.as_str());
            out.push_str(&ctx.sentinel(list, SentinelKind::List));
            let rest = &line[marker.end()..];
            match rest.find(':').filter(|_| marker.as_str().contains(';')) {
                Some(colon) => {
                    out.push_str(&rest[..colon]);
                    let dd = ctx.atom(TokenKind::Dd, ":");
                    out.push_str(&ctx.sentinel(dd, SentinelKind::List));
                    out.push_str(&rest[colon + 1..]);
                }
                None => out.push_str(rest),
            }
        }
        out
    }
}
