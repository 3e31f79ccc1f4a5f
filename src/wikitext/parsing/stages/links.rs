//! Stage 5: `[[internal links]]`, `[[File:…]]` and `[[Category:…]]`
//!
//! Brackets are paired with a stack, innermost first, so a file caption
//! can hold links of its own while a plain link cannot.

use super::Recognizer;
use crate::wikitext::ast::{Payload, TokenKind};
use crate::wikitext::config::Config;
use crate::wikitext::parsing::context::BuildContext;
use crate::wikitext::parsing::sentinel::{has_marker, has_marker_except, strip_kind, SentinelKind};

pub(crate) struct Links;

const FILE_NAMESPACE: i32 = 6;
const CATEGORY_NAMESPACE: i32 = 14;

/// Which link kind a target makes, or `None` for an invalid target
fn classify(target: &str, config: &Config) -> Option<TokenKind> {
    let stripped = strip_kind(target, SentinelKind::Comment);
    let trimmed = stripped.trim();
    if trimmed.is_empty()
        || trimmed.contains(['<', '>', '[', ']', '{', '}', '|', '\n'])
        || has_marker_except(trimmed, &[SentinelKind::Template, SentinelKind::Escape])
        || config.starts_with_protocol(trimmed)
    {
        return None;
    }
    if trimmed.starts_with(':') {
        return Some(TokenKind::Link);
    }
    let namespace = trimmed
        .split_once(':')
        .and_then(|(prefix, _)| config.namespace(prefix))
        .map(|ns| ns.id);
    Some(match namespace {
        Some(FILE_NAMESPACE) => TokenKind::FileLink,
        Some(CATEGORY_NAMESPACE) => TokenKind::Category,
        _ => TokenKind::Link,
    })
}

fn construct(ctx: &mut BuildContext<'_>, inner: &str) -> Option<String> {
    let (target, rest) = match inner.split_once('|') {
        Some((target, rest)) => (target, Some(rest)),
        None => (inner, None),
    };
    let kind = classify(target, &ctx.config)?;
    if kind != TokenKind::FileLink && rest.is_some_and(|r| has_marker(r, SentinelKind::Link)) {
        return None;
    }

    let link = ctx.token(kind, Payload::None);
    let target = ctx.atom(TokenKind::LinkTarget, target);
    ctx.attach(link, target);
    match (kind, rest) {
        (_, None) => {}
        (TokenKind::FileLink, Some(rest)) => {
            for parameter in rest.split('|') {
                let parameter = ctx.plain(TokenKind::ImageParameter, parameter);
                ctx.attach(link, parameter);
            }
        }
        (_, Some(rest)) => {
            let text = ctx.plain(TokenKind::LinkText, rest);
            ctx.attach(link, text);
        }
    }
    Some(ctx.sentinel(link, SentinelKind::Link))
}

impl Recognizer for Links {
    fn name(&self) -> &'static str {
        "links"
    }

    fn recognize(&self, text: &str, ctx: &mut BuildContext<'_>) -> String {
        if !text.contains("[[") {
            return text.to_string();
        }
        let bytes = text.as_bytes();
        let mut buf = String::with_capacity(text.len());
        let mut opens: Vec<usize> = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'[' => {
                    let n = bytes[i..].iter().take_while(|&&b| b == b'[').count();
                    if n >= 2 {
                        // `[[[a]]]` links the innermost pair
                        buf.push_str(&text[i..i + n - 2]);
                        opens.push(buf.len());
                        buf.push_str("[[");
                    } else {
                        buf.push('[');
                    }
                    i += n;
                }
                b']' if bytes.get(i + 1) == Some(&b']') => {
                    i += 2;
                    let Some(start) = opens.pop() else {
                        buf.push_str("]]");
                        continue;
                    };
                    let inner = buf[start + 2..].to_string();
                    match construct(ctx, &inner) {
                        Some(sentinel) => {
                            buf.truncate(start);
                            buf.push_str(&sentinel);
                        }
                        None => buf.push_str("]]"),
                    }
                }
                _ => {
                    let width = text[i..].chars().next().map_or(1, char::len_utf8);
                    let next = text[i + width..]
                        .find(['[', ']'])
                        .map_or(text.len(), |p| i + width + p);
                    buf.push_str(&text[i..next]);
                    i = next;
                }
            }
        }
        buf
    }
}
