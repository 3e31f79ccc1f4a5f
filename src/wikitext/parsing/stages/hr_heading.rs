//! Stage 4: behavior switches, horizontal rules and section headings

use super::{lines_with_offsets, Recognizer};
use crate::wikitext::ast::{Payload, TokenKind};
use crate::wikitext::parsing::context::BuildContext;
use crate::wikitext::parsing::sentinel::SentinelKind;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::sync::Arc;

pub(crate) struct RulesAndHeadings;

static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A-{4,}").unwrap());

/// Whitespace and comments allowed after the closing `=` of a heading
static HEADING_TRAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:[ \t]|\x00\d+c\x7F)*\z").unwrap());

/// Level and title span of a heading line, trail excluded
fn heading_level(core: &str) -> Option<(usize, &str)> {
    if core.len() < 2 || !core.starts_with('=') || !core.ends_with('=') {
        return None;
    }
    let leading = core.len() - core.trim_start_matches('=').len();
    if leading == core.len() {
        // `=====`: the middle `=` is the title
        let level = ((core.len() - 1) / 2).min(6);
        return (level > 0).then(|| (level, &core[level..core.len() - level]));
    }
    let trailing = core.len() - core.trim_end_matches('=').len();
    let level = leading.min(trailing).min(6);
    Some((level, &core[level..core.len() - level]))
}

impl Recognizer for RulesAndHeadings {
    fn name(&self) -> &'static str {
        "rules-and-headings"
    }

    fn recognize(&self, text: &str, ctx: &mut BuildContext<'_>) -> String {
        let config = Arc::clone(&ctx.config);
        let text = config
            .patterns()
            .double_underscore
            .replace_all(text, |caps: &Captures<'_>| {
                let switch = ctx.atom(TokenKind::DoubleUnderscore, &caps[0]);
                ctx.sentinel(switch, SentinelKind::DoubleUnderscore)
            });

        let first_at_line_start = ctx.at_line_start();
        let mut out = String::with_capacity(text.len());
        for (offset, line) in lines_with_offsets(&text) {
            if offset > 0 {
                out.push('\n');
            } else if !first_at_line_start {
                out.push_str(line);
                continue;
            }

            if let Some(rule) = RULE.find(line) {
                let hr = ctx.atom(TokenKind::Hr, rule.as_str());
                out.push_str(&ctx.sentinel(hr, SentinelKind::Hr));
                out.push_str(&line[rule.end()..]);
                continue;
            }

            let trail_start = HEADING_TRAIL.find(line).map_or(line.len(), |m| m.start());
            let (core, trail) = line.split_at(trail_start);
            match heading_level(core) {
                Some((level, title)) => {
                    let heading = ctx.token(TokenKind::Heading, Payload::Heading { level });
                    let title = ctx.plain(TokenKind::HeadingTitle, title);
                    let trail = ctx.atom(TokenKind::HeadingTrail, trail);
                    ctx.attach(heading, title);
                    ctx.attach(heading, trail);
                    out.push_str(&ctx.sentinel(heading, SentinelKind::Heading));
                }
                None => out.push_str(line),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("==a==", Some((2, "a")))]
    #[case("===a==", Some((2, "=a")))]
    #[case("=a=", Some((1, "a")))]
    #[case("========a========", Some((6, "==a==")))]
    #[case("===", Some((1, "=")))]
    #[case("==", None)]
    #[case("=a", None)]
    #[case("a==", None)]
    fn heading_levels(#[case] line: &str, #[case] expected: Option<(usize, &str)>) {
        assert_eq!(heading_level(line), expected);
    }

    #[test]
    fn trail_keeps_comments() {
        let line = "==a== \u{0}0c\u{7f} ";
        let start = HEADING_TRAIL.find(line).map(|m| m.start());
        assert_eq!(start, Some(5));
    }
}
