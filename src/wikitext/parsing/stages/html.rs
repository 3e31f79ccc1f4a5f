//! Stage 2: whitelisted HTML tags
//!
//! Tags are recognized one at a time, opening and closing alike; pairing
//! them up is left to consumers of the tree.

use super::{parse_attributes, Recognizer};
use crate::wikitext::ast::{Payload, TokenKind};
use crate::wikitext::parsing::context::BuildContext;
use crate::wikitext::parsing::sentinel::SentinelKind;
use regex::Captures;
use std::sync::Arc;

pub(crate) struct HtmlTags;

impl Recognizer for HtmlTags {
    fn name(&self) -> &'static str {
        "html"
    }

    fn recognize(&self, text: &str, ctx: &mut BuildContext<'_>) -> String {
        let config = Arc::clone(&ctx.config);
        config
            .patterns()
            .html
            .replace_all(text, |caps: &Captures<'_>| {
                let closing = caps.get(1).is_some_and(|m| !m.is_empty());
                let raw_name = caps.get(2).map_or("", |m| m.as_str());
                let attrs = caps.get(3).map_or("", |m| m.as_str());
                let self_closing = caps.get(4).is_some_and(|m| !m.is_empty());

                let html = ctx.token(
                    TokenKind::Html,
                    Payload::Html {
                        raw_name: raw_name.to_string(),
                        closing,
                        self_closing,
                    },
                );
                let attributes = parse_attributes(ctx, attrs);
                ctx.attach(html, attributes);
                ctx.sentinel(html, SentinelKind::Html)
            })
            .into_owned()
    }
}
