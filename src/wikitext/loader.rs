//! Document loading API
//!
//! `DocumentLoader` bundles the parse options of a run (configuration,
//! transclusion mode, last stage) so callers do not thread them through
//! every call.
//!
//! - String-based methods are the core functionality
//! - File-based methods read the file, then call the string method
//!
//! ```rust,ignore
//! use wikitext_ast::wikitext::loader::DocumentLoader;
//!
//! let loader = DocumentLoader::new().include(true);
//! let tree = loader.parse("{{tpl|a}}")?;
//! let tree = loader.load_and_parse("page.wiki")?;
//! let dump = loader.render("== a ==", "treeviz")?;
//! ```

use crate::wikitext::ast::Tree;
use crate::wikitext::config::{Config, ConfigError};
use crate::wikitext::formats::{FormatError, FormatRegistry};
use crate::wikitext::parsing::{parse_with, ParseError, ParseOptions};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug)]
pub enum LoaderError {
    Io(std::io::Error),
    Config(ConfigError),
    Parse(ParseError),
    Format(FormatError),
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderError::Io(err) => write!(f, "I/O error: {}", err),
            LoaderError::Config(err) => write!(f, "Configuration error: {}", err),
            LoaderError::Parse(err) => write!(f, "Parse error: {}", err),
            LoaderError::Format(err) => write!(f, "Format error: {}", err),
        }
    }
}

impl std::error::Error for LoaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoaderError::Io(err) => Some(err),
            LoaderError::Config(err) => Some(err),
            LoaderError::Parse(err) => Some(err),
            LoaderError::Format(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for LoaderError {
    fn from(err: std::io::Error) -> Self {
        LoaderError::Io(err)
    }
}

impl From<ConfigError> for LoaderError {
    fn from(err: ConfigError) -> Self {
        LoaderError::Config(err)
    }
}

impl From<ParseError> for LoaderError {
    fn from(err: ParseError) -> Self {
        LoaderError::Parse(err)
    }
}

impl From<FormatError> for LoaderError {
    fn from(err: FormatError) -> Self {
        LoaderError::Format(err)
    }
}

/// Primary API for turning documents into trees
pub struct DocumentLoader {
    options: ParseOptions,
    formats: FormatRegistry,
}

impl DocumentLoader {
    /// Loader with the built-in configuration and every stage enabled
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            formats: FormatRegistry::with_defaults(),
        }
    }

    /// Replace the configuration with one loaded from a JSON file
    pub fn with_config_path(mut self, path: impl AsRef<Path>) -> Result<Self, LoaderError> {
        let config = Config::from_path(path)?;
        self.options = self.options.config(Arc::new(config));
        Ok(self)
    }

    pub fn include(mut self, include: bool) -> Self {
        self.options = self.options.include(include);
        self
    }

    pub fn max_stage(mut self, max_stage: u8) -> Self {
        self.options = self.options.max_stage(max_stage);
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    // ===== STRING-BASED PROCESSING =====

    pub fn parse(&self, source: &str) -> Result<Tree, LoaderError> {
        Ok(parse_with(source, &self.options)?)
    }

    /// Parse `source` and serialize the tree with the named format
    pub fn render(&self, source: &str, format: &str) -> Result<String, LoaderError> {
        let tree = self.parse(source)?;
        Ok(self.formats.serialize(&tree, format)?)
    }

    // ===== FILE-BASED PROCESSING =====

    pub fn load_and_parse(&self, path: impl AsRef<Path>) -> Result<Tree, LoaderError> {
        let source = fs::read_to_string(path)?;
        self.parse(&source)
    }

    pub fn load_and_render(&self, path: impl AsRef<Path>, format: &str) -> Result<String, LoaderError> {
        let source = fs::read_to_string(path)?;
        self.render(&source, format)
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wikitext::ast::TokenKind;
    use std::io::Write;

    #[test]
    fn test_parse_string() {
        let tree = DocumentLoader::new().parse("{{a}}").unwrap();
        assert!(tree.find_first(tree.root(), TokenKind::Template).is_some());
    }

    #[test]
    fn test_max_stage_limits_recognition() {
        let tree = DocumentLoader::new().max_stage(1).parse("[[a]]").unwrap();
        assert!(tree.find_first(tree.root(), TokenKind::Link).is_none());
        assert_eq!(tree.to_string(tree.root()), "[[a]]");
    }

    #[test]
    fn test_load_missing_file() {
        let result = DocumentLoader::new().load_and_parse("/nonexistent/page.wiki");
        assert!(matches!(result, Err(LoaderError::Io(_))));
    }

    #[test]
    fn test_load_and_render_file() {
        let path = std::env::temp_dir().join(format!("wikiast-loader-{}.wiki", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "'''b'''").unwrap();
        let output = DocumentLoader::new().load_and_render(&path, "roundtrip").unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(output, "'''b'''");
    }

    #[test]
    fn test_unknown_format() {
        let result = DocumentLoader::new().render("x", "yaml");
        assert!(matches!(result, Err(LoaderError::Format(FormatError::FormatNotFound(_)))));
    }
}
