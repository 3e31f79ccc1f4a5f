//! Stage recognizers
//!
//! Each stage owns one construct family and is a [`Recognizer`]: it receives
//! a container's pending text, constructs tokens for what it recognizes
//! through the [`BuildContext`] and returns the text with those spans
//! replaced by sentinels. Unrecognized or malformed input is returned
//! unchanged.
//!
//! Stages run in a fixed priority order that mirrors how wikitext resolves
//! ambiguity: tags, braces, HTML, tables, rules and headings, links, quotes,
//! external links, free links, lists, language conversion.

mod attributes;
mod braces;
mod comment_ext;
mod converter;
mod ext_links;
mod hr_heading;
mod html;
mod links;
mod lists;
mod magic_links;
mod quotes;
mod table;

use super::context::BuildContext;

pub(crate) use attributes::parse_attributes;

/// Number of stages; a container whose stage reached this is fully staged
pub const MAX_STAGE: u8 = 11;

pub trait Recognizer: Sync {
    fn name(&self) -> &'static str;

    /// Rewrite `text`, replacing recognized constructs with sentinels
    fn recognize(&self, text: &str, ctx: &mut BuildContext<'_>) -> String;
}

static RECOGNIZERS: [&dyn Recognizer; MAX_STAGE as usize] = [
    &comment_ext::CommentsAndTags,
    &braces::Braces,
    &html::HtmlTags,
    &table::Tables,
    &hr_heading::RulesAndHeadings,
    &links::Links,
    &quotes::Quotes,
    &ext_links::ExtLinks,
    &magic_links::MagicLinks,
    &lists::Lists,
    &converter::Converters,
];

pub(crate) fn recognizer_for(stage: u8) -> Option<&'static dyn Recognizer> {
    RECOGNIZERS.get(stage as usize).copied()
}

/// Split `text` into lines, each with the byte offset where it starts
pub(crate) fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    text.split('\n').map(move |line| {
        let start = offset;
        offset += line.len() + 1;
        (start, line)
    })
}
