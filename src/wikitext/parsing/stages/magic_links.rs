//! Stage 8: bare URLs and ISBN / RFC / PMID magic links
//!
//! Nothing is linked inside the label of a bracketed external link.

use super::Recognizer;
use crate::wikitext::ast::TokenKind;
use crate::wikitext::parsing::context::BuildContext;
use crate::wikitext::parsing::sentinel::SentinelKind;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::sync::Arc;

pub(crate) struct MagicLinks;

static ISBN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bISBN[ \t]+(?:97[89][\- ]?)?(?:\d[\- ]?){9}[\dXx]\b").unwrap()
});
static RFC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bRFC[ \t]+\d+\b").unwrap());
static PMID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bPMID[ \t]+\d+\b").unwrap());

/// Length of `url` once trailing punctuation is dropped; a closing
/// parenthesis stays only when the URL also has an opening one
fn trimmed_url_len(url: &str) -> usize {
    let keep_paren = url.contains('(');
    url.trim_end_matches(|c: char| matches!(c, ',' | ';' | '.' | ':' | '!' | '?') || (c == ')' && !keep_paren))
        .len()
}

fn link(ctx: &mut BuildContext<'_>, text: &str) -> String {
    let magic = ctx.atom(TokenKind::MagicLink, text);
    ctx.sentinel(magic, SentinelKind::ExtLink)
}

impl Recognizer for MagicLinks {
    fn name(&self) -> &'static str {
        "magic-links"
    }

    fn recognize(&self, text: &str, ctx: &mut BuildContext<'_>) -> String {
        if ctx.owner == TokenKind::ExtLinkText {
            return text.to_string();
        }
        let config = Arc::clone(&ctx.config);
        let mut text = config
            .patterns()
            .free_link
            .replace_all(text, |caps: &Captures<'_>| {
                let url = &caps[0];
                let len = trimmed_url_len(url);
                let mut out = link(ctx, &url[..len]);
                out.push_str(&url[len..]);
                out
            })
            .into_owned();

        let switches = &config.settings().magic_links;
        for (enabled, pattern) in [(switches.isbn, &ISBN), (switches.rfc, &RFC), (switches.pmid, &PMID)] {
            if enabled {
                text = pattern
                    .replace_all(&text, |caps: &Captures<'_>| link(ctx, &caps[0]))
                    .into_owned();
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://a.org/x.", "http://a.org/x")]
    #[case("http://a.org/x).", "http://a.org/x")]
    #[case("http://a.org/(x)", "http://a.org/(x)")]
    #[case("http://a.org/?", "http://a.org/")]
    fn trims_trailing_punctuation(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(&url[..trimmed_url_len(url)], expected);
    }

    #[test]
    fn isbn_accepts_hyphens() {
        assert!(ISBN.is_match("see ISBN 978-0-306-40615-7 now"));
        assert!(!ISBN.is_match("ISBN 12"));
    }
}
