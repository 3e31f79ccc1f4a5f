//! # wikitext-ast
//!
//! Turns raw MediaWiki markup into a mutable, queryable syntax tree that
//! serializes back to exactly the source it was parsed from.
//!
//! Parsing does not use recursive descent. Instead a root token runs eleven
//! stages over its pending text; each stage recognizes one construct family,
//! builds a specialized token for every match and splices a short sentinel
//! marker into the text in its place. Once all stages ran, the build phase
//! swaps every sentinel for the node it stands for.
//!
//! ```text
//! text ─► stage 0 … stage 10 ─► build ─► after_build ─► Tree
//!             │  (accumulator of tokens, sentinel markers in text)
//! ```
//!
//! The entry point is [`wikitext::parsing::parse`]; the tree it returns is a
//! [`wikitext::ast::Tree`].

#![allow(rustdoc::invalid_html_tags)]

pub mod wikitext;

pub use wikitext::ast::{NodeId, Tree, TreeError};
pub use wikitext::config::Config;
pub use wikitext::parsing::{parse, parse_with, ParseError, ParseOptions};
