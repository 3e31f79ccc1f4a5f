//! Stage 0: comments, extension tags and inclusion markup
//!
//! The text is scanned left to right so that whatever opens first wins: a
//! comment swallows tags inside it, and an extension tag swallows comments
//! inside its body. Bodies of wikitext extensions (`<ref>`) become containers
//! that are taken through stage 0 immediately.

use super::{parse_attributes, Recognizer};
use crate::wikitext::ast::{Payload, TokenKind};
use crate::wikitext::config::INCLUDE_TAGS;
use crate::wikitext::parsing::context::BuildContext;
use crate::wikitext::parsing::sentinel::SentinelKind;

pub(crate) struct CommentsAndTags;

impl Recognizer for CommentsAndTags {
    fn name(&self) -> &'static str {
        "comments-and-tags"
    }

    fn recognize(&self, text: &str, ctx: &mut BuildContext<'_>) -> String {
        let config = std::sync::Arc::clone(&ctx.config);
        let pattern = &config.patterns().comment_and_ext;
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;

        while let Some(caps) = pattern.captures_at(text, cursor) {
            let Some(whole) = caps.get(0) else { break };
            out.push_str(&text[cursor..whole.start()]);

            if whole.as_str() == "<!--" {
                let body_start = whole.end();
                let (body, end, closed) = match text[body_start..].find("-->") {
                    Some(p) => (&text[body_start..body_start + p], body_start + p + 3, true),
                    None => (&text[body_start..], text.len(), false),
                };
                let comment = ctx.atom(TokenKind::Comment, body);
                if let Some(token) = ctx.tree.token_mut(comment) {
                    token.payload = Payload::Comment { closed };
                }
                out.push_str(&ctx.sentinel(comment, SentinelKind::Comment));
                cursor = end;
                continue;
            }

            let closing = caps.get(1).is_some_and(|m| !m.is_empty());
            let raw_name = caps.get(2).map_or("", |m| m.as_str());
            let attrs = caps.get(3).map_or("", |m| m.as_str());
            let self_closing = caps.get(4).is_some_and(|m| !m.is_empty());
            let name = raw_name.to_lowercase();

            if INCLUDE_TAGS.contains(&name.as_str()) {
                // `<includeonly>` blocks vanish from a page view, `<noinclude>`
                // blocks from a transclusion; everything else is a bare marker
                let hidden = if ctx.include { "noinclude" } else { "includeonly" };
                let end = if name == hidden && !closing && !self_closing {
                    config
                        .patterns()
                        .ext_close
                        .get(&name)
                        .and_then(|re| re.find_at(text, whole.end()))
                        .map_or(text.len(), |m| m.end())
                } else {
                    whole.end()
                };
                let include = ctx.atom(TokenKind::Include, &text[whole.start()..end]);
                out.push_str(&ctx.sentinel(include, SentinelKind::Comment));
                cursor = end;
                continue;
            }

            if closing {
                // stray closing tag
                out.push_str(whole.as_str());
                cursor = whole.end();
                continue;
            }

            let close = if self_closing {
                None
            } else {
                match config
                    .patterns()
                    .ext_close
                    .get(&name)
                    .and_then(|re| re.find_at(text, whole.end()))
                {
                    Some(close) => Some(close),
                    None => {
                        // unclosed tags stay literal
                        out.push_str(whole.as_str());
                        cursor = whole.end();
                        continue;
                    }
                }
            };

            let ext = ctx.token(
                TokenKind::Ext,
                Payload::Ext {
                    raw_name: raw_name.to_string(),
                    self_closing,
                    closing: close.map_or(String::new(), |c| c.as_str().to_string()),
                },
            );
            let attributes = parse_attributes(ctx, attrs);
            ctx.attach(ext, attributes);

            if let Some(close) = close {
                let body = &text[whole.end()..close.start()];
                if config.is_wikitext_ext(&name) {
                    let inner = ctx.plain(TokenKind::ExtInner, body);
                    ctx.attach(ext, inner);
                    ctx.parse_now(inner);
                } else {
                    let inner = ctx.atom(TokenKind::ExtRaw, body);
                    ctx.attach(ext, inner);
                }
                cursor = close.end();
            } else {
                cursor = whole.end();
            }
            out.push_str(&ctx.sentinel(ext, SentinelKind::Ext));
        }
        out.push_str(&text[cursor..]);
        out
    }
}
