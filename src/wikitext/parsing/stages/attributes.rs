//! Tag attribute strings: ` name="x" class=y disabled`
//!
//! Shared by extension tags, HTML tags and table syntax. Everything that is
//! not an attribute (whitespace, stray characters, sentinels of constructs
//! recognized earlier) is kept as text between attribute tokens.

use crate::wikitext::ast::{NodeId, Payload, TokenKind};
use crate::wikitext::parsing::context::BuildContext;
use once_cell::sync::Lazy;
use regex::Regex;

// A sentinel is matched as a whole first so a key never starts inside one
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\x00\d+[a-z!]\x7F|(?P<key>[^\s/=>"'\x00\x7F]+)(?:(?P<eq>\s*=\s*)(?:"(?P<dq>[^"]*)(?P<dqe>"?)|'(?P<sq>[^']*)(?P<sqe>'?)|(?P<bare>[^\s>"']*)))?"#,
    )
    .unwrap()
});

/// Build an `attributes` token for `text`
pub(crate) fn parse_attributes(ctx: &mut BuildContext<'_>, text: &str) -> NodeId {
    let attributes = ctx.token(TokenKind::Attributes, Payload::None);
    let mut cursor = 0;

    for caps in ATTRIBUTE.captures_iter(text) {
        let (Some(whole), Some(key)) = (caps.get(0), caps.name("key")) else {
            continue;
        };

        let (equal, quote, value, closed) = match caps.name("eq") {
            None => (String::new(), None, "", false),
            Some(eq) => {
                let equal = eq.as_str().to_string();
                if let Some(dq) = caps.name("dq") {
                    let closed = caps.name("dqe").is_some_and(|m| !m.is_empty());
                    (equal, Some('"'), dq.as_str(), closed)
                } else if let Some(sq) = caps.name("sq") {
                    let closed = caps.name("sqe").is_some_and(|m| !m.is_empty());
                    (equal, Some('\''), sq.as_str(), closed)
                } else {
                    (equal, None, caps.name("bare").map_or("", |m| m.as_str()), false)
                }
            }
        };

        if whole.start() > cursor {
            ctx.text(attributes, &text[cursor..whole.start()]);
        }
        cursor = whole.end();

        let attribute = ctx.token(
            TokenKind::Attribute,
            Payload::Attribute {
                key: key.as_str().to_string(),
                equal,
                quote,
                closed,
            },
        );
        let value = ctx.atom(TokenKind::AttrValue, value);
        ctx.attach(attribute, value);
        ctx.attach(attributes, attribute);
    }
    if cursor < text.len() {
        ctx.text(attributes, &text[cursor..]);
    }
    attributes
}
