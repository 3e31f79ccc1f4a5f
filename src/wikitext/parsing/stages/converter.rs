//! Stage 10: language conversion, `-{flags|variant:text;variant:text}-`
//!
//! `-{`/`}-` pairs are matched with a stack, so conversions nest. A body
//! that does not read as variant rules is kept as one rule with only a
//! target text.

use super::Recognizer;
use crate::wikitext::ast::{NodeId, Payload, TokenKind};
use crate::wikitext::config::Config;
use crate::wikitext::parsing::context::BuildContext;
use crate::wikitext::parsing::sentinel::SentinelKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

pub(crate) struct Converters;

static FLAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A[A-Za-z;\s\-]*\z").unwrap());
static RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A(?:(.*?)=>)?(\s*[A-Za-z\-]+\s*):(.*)\z").unwrap());

/// `from=>variant:to` split into its parts
#[derive(Debug, PartialEq, Eq)]
struct Rule<'a> {
    from: Option<&'a str>,
    variant: &'a str,
    to: &'a str,
}

fn parse_rule<'a>(piece: &'a str, config: &Config) -> Option<Rule<'a>> {
    let caps = RULE.captures(piece)?;
    let variant = caps.get(2)?.as_str();
    if !config.is_variant(variant.trim()) {
        return None;
    }
    Some(Rule {
        from: caps.get(1).map(|m| m.as_str()),
        variant,
        to: caps.get(3).map_or("", |m| m.as_str()),
    })
}

fn rule(ctx: &mut BuildContext<'_>, parent: NodeId, piece: &str, parsed: Option<Rule<'_>>) {
    let (from, variant, to, arrow, colon) = match parsed {
        Some(rule) => (rule.from.unwrap_or(""), rule.variant, rule.to, rule.from.is_some(), true),
        None => ("", "", piece, false, false),
    };
    let node = ctx.token(TokenKind::ConverterRule, Payload::ConverterRule { arrow, colon });
    let from = ctx.atom(TokenKind::ConverterRuleFrom, from);
    let variant = ctx.atom(TokenKind::ConverterRuleVariant, variant);
    let to = ctx.plain(TokenKind::ConverterRuleTo, to);
    ctx.attach(node, from);
    ctx.attach(node, variant);
    ctx.attach(node, to);
    ctx.attach(parent, node);
}

fn construct(ctx: &mut BuildContext<'_>, inner: &str) -> String {
    let (flags, body) = match inner.split_once('|') {
        Some((flags, body)) if FLAGS.is_match(flags) => (Some(flags), body),
        _ => (None, inner),
    };
    let converter = ctx.token(
        TokenKind::Converter,
        Payload::Converter {
            has_flags: flags.is_some(),
        },
    );
    let flags = ctx.atom(TokenKind::ConverterFlags, flags.unwrap_or(""));
    ctx.attach(converter, flags);

    let config = Arc::clone(&ctx.config);
    let pieces: Vec<(&str, Option<Rule<'_>>)> = body
        .split(';')
        .map(|piece| (piece, parse_rule(piece, &config)))
        .collect();
    if pieces.iter().any(|(_, parsed)| parsed.is_some()) {
        for (piece, parsed) in pieces {
            rule(ctx, converter, piece, parsed);
        }
    } else {
        rule(ctx, converter, body, None);
    }
    ctx.sentinel(converter, SentinelKind::Converter)
}

impl Recognizer for Converters {
    fn name(&self) -> &'static str {
        "converters"
    }

    fn recognize(&self, text: &str, ctx: &mut BuildContext<'_>) -> String {
        if !text.contains("-{") {
            return text.to_string();
        }
        let mut buf = String::with_capacity(text.len());
        let mut opens: Vec<usize> = Vec::new();
        let mut rest = text;

        while let Some(at) = rest.find(['-', '}']) {
            buf.push_str(&rest[..at]);
            let tail = &rest[at..];
            if let Some(after) = tail.strip_prefix("-{") {
                opens.push(buf.len());
                buf.push_str("-{");
                rest = after;
            } else if let Some((after, start)) = tail
                .strip_prefix("}-")
                .and_then(|after| opens.pop().map(|start| (after, start)))
            {
                let inner = buf[start + 2..].to_string();
                buf.truncate(start);
                buf.push_str(&construct(ctx, &inner));
                rest = after;
            } else {
                buf.push_str(&tail[..1]);
                rest = &tail[1..];
            }
        }
        buf.push_str(rest);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_variant_rules() {
        let config = Config::default();
        assert_eq!(
            parse_rule("zh-hans:计算机", &config),
            Some(Rule {
                from: None,
                variant: "zh-hans",
                to: "计算机"
            })
        );
        assert_eq!(
            parse_rule("A=>zh-tw:B", &config),
            Some(Rule {
                from: Some("A"),
                variant: "zh-tw",
                to: "B"
            })
        );
        assert_eq!(parse_rule("xx:y", &config), None);
        assert_eq!(parse_rule("plain", &config), None);
    }

    #[test]
    fn flags_are_letters_only() {
        assert!(FLAGS.is_match("R"));
        assert!(FLAGS.is_match("zh-hans;zh-hant"));
        assert!(!FLAGS.is_match("a:b"));
    }
}
