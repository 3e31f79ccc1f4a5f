//! Stage 1: `{{template}}`, `{{{arg}}}`, `{{#function:…}}`, `{{!}}`
//!
//! Braces are matched with an explicit frame stack rather than a regex, the
//! same way the MediaWiki preprocessor does it:
//!
//! - a run of two or more `{` opens a frame remembering how many braces it has
//! - a run of `}` closes the innermost frame; it takes three braces when both
//!   sides have at least three (an argument), otherwise two (a template)
//! - leftover opening braces of a partly consumed frame stay open for the next
//!   closing run, so `{{{{{a}}}}}` is `{{` + `{{{a}}}` + `}}` only if it has to be
//! - `[[` opens a frame too, only so the pipes of a link are not mistaken for
//!   parameter separators; while it is innermost, `}}` is plain text
//!
//! Pipes and the first `=` after each pipe are recorded on the innermost
//! frame as the text streams past, so splitting a construct into parameters
//! never rescans text. Inner constructs are replaced by sentinels before the
//! frame around them closes, so a frame only ever sees its own separators.

use super::Recognizer;
use crate::wikitext::ast::{NodeId, Payload, TokenKind};
use crate::wikitext::parsing::context::BuildContext;
use crate::wikitext::parsing::sentinel::{has_marker_except, strip_kind, SentinelKind};

pub(crate) struct Braces;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Braces,
    Brackets,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    /// Buffer offset of the first opening character
    start: usize,
    /// Opening characters not matched yet
    count: usize,
    /// Buffer offset of every pipe at this level, with the first `=` after it
    parts: Vec<(usize, Option<usize>)>,
}

fn run_length(bytes: &[u8], from: usize, byte: u8) -> usize {
    bytes[from..].iter().take_while(|&&b| b == byte).count()
}

fn is_special(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']' | '|' | '=')
}

impl Recognizer for Braces {
    fn name(&self) -> &'static str {
        "braces"
    }

    fn recognize(&self, text: &str, ctx: &mut BuildContext<'_>) -> String {
        let bytes = text.as_bytes();
        let mut buf = String::with_capacity(text.len());
        let mut stack: Vec<Frame> = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'{' => {
                    let n = run_length(bytes, i, b'{');
                    if n >= 2 {
                        stack.push(Frame {
                            kind: FrameKind::Braces,
                            start: buf.len(),
                            count: n,
                            parts: Vec::new(),
                        });
                    }
                    buf.push_str(&text[i..i + n]);
                    i += n;
                }
                b'[' if bytes.get(i + 1) == Some(&b'[') => {
                    stack.push(Frame {
                        kind: FrameKind::Brackets,
                        start: buf.len(),
                        count: 2,
                        parts: Vec::new(),
                    });
                    buf.push_str("[[");
                    i += 2;
                }
                b']' if bytes.get(i + 1) == Some(&b']')
                    && stack.last().is_some_and(|f| f.kind == FrameKind::Brackets) =>
                {
                    stack.pop();
                    buf.push_str("]]");
                    i += 2;
                }
                b'|' => {
                    if let Some(frame) = stack.last_mut().filter(|f| f.kind == FrameKind::Braces) {
                        frame.parts.push((buf.len(), None));
                    }
                    buf.push('|');
                    i += 1;
                }
                b'=' => {
                    if let Some(frame) = stack.last_mut().filter(|f| f.kind == FrameKind::Braces) {
                        if let Some(part) = frame.parts.last_mut().filter(|p| p.1.is_none()) {
                            part.1 = Some(buf.len());
                        }
                    }
                    buf.push('=');
                    i += 1;
                }
                b'}' => {
                    let n = run_length(bytes, i, b'}');
                    i += n;
                    close(&mut buf, &mut stack, n, ctx);
                }
                _ => {
                    let next = text[i..]
                        .find(is_special)
                        .map_or(text.len(), |p| i + p);
                    if next == i {
                        // lone `[` or `]`
                        buf.push(bytes[i] as char);
                        i += 1;
                    } else {
                        buf.push_str(&text[i..next]);
                        i = next;
                    }
                }
            }
        }
        buf
    }
}

/// Match a run of `n` closing braces against the innermost frames
fn close(buf: &mut String, stack: &mut Vec<Frame>, n: usize, ctx: &mut BuildContext<'_>) {
    let mut remaining = n;
    while remaining >= 2 {
        let Some(frame) = stack.last_mut().filter(|f| f.kind == FrameKind::Braces) else {
            break;
        };
        let matched = if remaining >= 3 && frame.count >= 3 { 3 } else { 2 };
        let open = frame.start + frame.count - matched;
        let content_start = open + matched;
        let content = buf[content_start..].to_string();
        let parts: Vec<(usize, Option<usize>)> = frame
            .parts
            .iter()
            .map(|&(pipe, eq)| (pipe - content_start, eq.map(|e| e - content_start)))
            .collect();

        match construct(ctx, &content, &parts, matched) {
            Some(sentinel) => {
                buf.truncate(open);
                buf.push_str(&sentinel);
                frame.count -= matched;
                frame.parts.clear();
                remaining -= matched;
                if frame.count < 2 {
                    stack.pop();
                }
            }
            None => {
                // declined: the whole frame is literal text
                buf.push_str(&"}".repeat(matched));
                remaining -= matched;
                stack.pop();
            }
        }
    }
    buf.push_str(&"}".repeat(remaining));
}

/// A segment of a construct: its text and the offset of its first `=`
struct Segment<'a> {
    text: &'a str,
    eq: Option<usize>,
}

fn segments<'a>(content: &'a str, parts: &[(usize, Option<usize>)]) -> Vec<Segment<'a>> {
    let mut out = Vec::with_capacity(parts.len() + 1);
    let mut start = 0;
    let mut eq = None;
    for &(pipe, next_eq) in parts {
        out.push(Segment {
            text: &content[start..pipe],
            eq,
        });
        start = pipe + 1;
        eq = next_eq.map(|e| e - start);
    }
    out.push(Segment {
        text: &content[start..],
        eq,
    });
    out
}

/// Build the token for a matched span; `None` declines it
fn construct(
    ctx: &mut BuildContext<'_>,
    content: &str,
    parts: &[(usize, Option<usize>)],
    matched: usize,
) -> Option<String> {
    let segments = segments(content, parts);
    if matched == 3 {
        return Some(argument(ctx, &segments));
    }

    let name = segments[0].text;
    if name == "!" && segments.len() == 1 {
        let escape = ctx.atom(TokenKind::Escape, "!");
        return Some(ctx.sentinel(escape, SentinelKind::Escape));
    }

    if let Some(colon) = name.find(':') {
        let head = name[..colon].trim();
        if ctx.config.is_parser_function(head) || ctx.config.is_variable(head) {
            return Some(magic_word(ctx, &name[..colon], Some(&name[colon + 1..]), &segments[1..]));
        }
    }
    if ctx.config.is_variable(name.trim()) {
        return Some(magic_word(ctx, name, None, &segments[1..]));
    }

    if !valid_title(name) {
        return None;
    }
    let template = ctx.token(TokenKind::Template, Payload::None);
    let name = ctx.atom(TokenKind::TemplateName, name);
    ctx.attach(template, name);
    for segment in &segments[1..] {
        parameter(ctx, template, segment, false);
    }
    Some(ctx.sentinel(template, SentinelKind::Template))
}

/// A template name must be non-empty once comments are gone and carry no
/// link, tag or brace syntax; templates and arguments inside it are allowed
fn valid_title(name: &str) -> bool {
    let stripped = strip_kind(name, SentinelKind::Comment);
    let trimmed = stripped.trim();
    !trimmed.is_empty()
        && !trimmed.contains(['<', '>', '[', ']', '{', '}', '|', '\n'])
        && !has_marker_except(trimmed, &[SentinelKind::Template])
}

fn argument(ctx: &mut BuildContext<'_>, segments: &[Segment<'_>]) -> String {
    let arg = ctx.token(TokenKind::Arg, Payload::None);
    let name = ctx.atom(TokenKind::ArgName, segments[0].text);
    ctx.attach(arg, name);
    if let Some(default) = segments.get(1) {
        let default = ctx.plain(TokenKind::ArgDefault, default.text);
        ctx.attach(arg, default);
    }
    for extra in segments.iter().skip(2) {
        let extra = ctx.atom(TokenKind::ArgExtra, extra.text);
        ctx.attach(arg, extra);
    }
    ctx.sentinel(arg, SentinelKind::Template)
}

fn magic_word(
    ctx: &mut BuildContext<'_>,
    name: &str,
    first: Option<&str>,
    rest: &[Segment<'_>],
) -> String {
    let word = ctx.token(
        TokenKind::MagicWord,
        Payload::MagicWord {
            colon: first.is_some(),
        },
    );
    let name = ctx.atom(TokenKind::MagicWordName, name);
    ctx.attach(word, name);
    if let Some(first) = first {
        parameter(ctx, word, &Segment { text: first, eq: None }, true);
    }
    for segment in rest {
        parameter(ctx, word, segment, false);
    }
    ctx.sentinel(word, SentinelKind::Template)
}

fn parameter(ctx: &mut BuildContext<'_>, parent: NodeId, segment: &Segment<'_>, anonymous: bool) {
    let split = segment.eq.filter(|_| !anonymous);
    let param = ctx.token(
        TokenKind::Parameter,
        Payload::Parameter {
            anonymous: split.is_none(),
        },
    );
    let (key, value) = match split {
        Some(eq) => (&segment.text[..eq], &segment.text[eq + 1..]),
        None => ("", segment.text),
    };
    let key = ctx.atom(TokenKind::ParameterKey, key);
    let value = ctx.plain(TokenKind::ParameterValue, value);
    ctx.attach(param, key);
    ctx.attach(param, value);
    ctx.attach(parent, param);
}
