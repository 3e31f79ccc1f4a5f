//! Main module for wikitext library functionality

pub mod ast;
pub mod config;
pub mod formats;
pub mod loader;
pub mod parsing;
pub mod ranges;
