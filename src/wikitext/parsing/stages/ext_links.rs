//! Stage 7: bracketed external links, `[https://example.org label]`

use super::Recognizer;
use crate::wikitext::ast::{Payload, TokenKind};
use crate::wikitext::parsing::context::BuildContext;
use crate::wikitext::parsing::sentinel::SentinelKind;
use regex::Captures;
use std::sync::Arc;

pub(crate) struct ExtLinks;

impl Recognizer for ExtLinks {
    fn name(&self) -> &'static str {
        "ext-links"
    }

    fn recognize(&self, text: &str, ctx: &mut BuildContext<'_>) -> String {
        if !text.contains('[') {
            return text.to_string();
        }
        let config = Arc::clone(&ctx.config);
        config
            .patterns()
            .ext_link
            .replace_all(text, |caps: &Captures<'_>| {
                let url = caps.get(1).map_or("", |m| m.as_str());
                let space = caps.get(2).map_or("", |m| m.as_str());
                let label = caps.get(3).map_or("", |m| m.as_str());

                let link = ctx.token(
                    TokenKind::ExtLink,
                    Payload::ExtLink {
                        space: space.to_string(),
                    },
                );
                let url = ctx.atom(TokenKind::ExtLinkUrl, url);
                ctx.attach(link, url);
                if !label.is_empty() {
                    let label = ctx.plain(TokenKind::ExtLinkText, label);
                    ctx.attach(link, label);
                }
                ctx.sentinel(link, SentinelKind::ExtLink)
            })
            .into_owned()
    }
}
