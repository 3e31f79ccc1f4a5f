//! Parser configuration
//!
//! `defaults/wikitext.default.json` is embedded into every binary so that the
//! built-in tag, namespace and protocol tables stay in one place. Callers can
//! load their own JSON (for a wiki with extra extensions or localized
//! namespaces) through [`Config::from_json`] or [`Config::from_path`].
//!
//! A [`Config`] is the deserialized [`Settings`] plus the regexes compiled from
//! them. Stage recognizers only ever read it; one `Arc<Config>` can be shared
//! by any number of independent parses.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const DEFAULT_JSON: &str = include_str!("../../defaults/wikitext.default.json");

static DEFAULT_CONFIG: Lazy<Arc<Config>> = Lazy::new(|| {
    Arc::new(Config::from_json(DEFAULT_JSON).expect("embedded default config is valid"))
});

/// Errors raised while loading or compiling a configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// File could not be read
    Io(String),
    /// JSON did not match the expected shape
    Json(String),
    /// A derived pattern failed to compile
    Pattern(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config IO error: {}", msg),
            ConfigError::Json(msg) => write!(f, "Config format error: {}", msg),
            ConfigError::Pattern(msg) => write!(f, "Config pattern error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

impl From<regex::Error> for ConfigError {
    fn from(err: regex::Error) -> Self {
        ConfigError::Pattern(err.to_string())
    }
}

/// A namespace with its canonical name and accepted aliases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Switches for ISBN / RFC / PMID magic links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicLinks {
    pub isbn: bool,
    pub rfc: bool,
    pub pmid: bool,
}

impl Default for MagicLinks {
    fn default() -> Self {
        Self {
            isbn: true,
            rfc: true,
            pmid: true,
        }
    }
}

/// The raw, serializable configuration tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Extension tags, e.g. `ref`, `nowiki`
    pub ext: Vec<String>,
    /// Extension tags whose body is itself wikitext
    #[serde(default)]
    pub wikitext_ext: Vec<String>,
    /// HTML tags allowed in wikitext
    pub html: Vec<String>,
    /// Parser function names (lowercase, with `#` where the wiki expects one)
    pub parser_functions: Vec<String>,
    /// Variables, case-sensitive (`PAGENAME`)
    pub variables: Vec<String>,
    /// Behavior switches without the surrounding `__`
    pub double_underscore: Vec<String>,
    /// URL protocols, e.g. `https://`, `mailto:`
    pub protocols: Vec<String>,
    /// Language variants for `-{ }-` rules
    #[serde(default)]
    pub variants: Vec<String>,
    pub namespaces: Vec<Namespace>,
    #[serde(default)]
    pub magic_links: MagicLinks,
}

/// Regexes and lookup tables derived from [`Settings`]
#[derive(Debug, Clone)]
pub(crate) struct Patterns {
    pub(crate) comment_and_ext: Regex,
    pub(crate) ext_close: HashMap<String, Regex>,
    pub(crate) html: Regex,
    pub(crate) ext_link: Regex,
    pub(crate) free_link: Regex,
    pub(crate) protocol_start: Regex,
    pub(crate) double_underscore: Regex,
    parser_functions: HashSet<String>,
    variables: HashSet<String>,
    wikitext_ext: HashSet<String>,
    variants: HashSet<String>,
    namespaces: HashMap<String, usize>,
}

/// Tags that steer transclusion and are recognized in stage 0
pub const INCLUDE_TAGS: [&str; 3] = ["noinclude", "includeonly", "onlyinclude"];

fn alternation<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let mut names: Vec<&String> = names.into_iter().collect();
    // longest first so that `br` is tried before `b`
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    names
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|")
}

/// Lowercase, collapse `_` and whitespace runs into single spaces
pub(crate) fn normalize_key(s: &str) -> String {
    s.replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl Patterns {
    fn compile(settings: &Settings) -> Result<Self, ConfigError> {
        let include_tags: Vec<String> = INCLUDE_TAGS.iter().map(|s| s.to_string()).collect();
        let tag_names = alternation(settings.ext.iter().chain(include_tags.iter()));
        let comment_and_ext = Regex::new(&format!(
            r"(?i)<!--|<(/?)({})(\s[^>]*?)?(/?)>",
            tag_names
        ))?;

        let mut ext_close = HashMap::new();
        for name in settings.ext.iter().chain(include_tags.iter()) {
            let lower = name.to_lowercase();
            let re = Regex::new(&format!(r"(?i)</{}\s*>", regex::escape(&lower)))?;
            ext_close.insert(lower, re);
        }

        let html = Regex::new(&format!(
            r"(?i)<(/?)({})(\s[^<>]*?)?(/?)>",
            alternation(settings.html.iter())
        ))?;

        let protocols = alternation(settings.protocols.iter());
        let free_protocols = alternation(settings.protocols.iter().filter(|p| !p.starts_with("//")));

        // URL characters, or an embedded template/comment/escape sentinel
        let url = r"(?:[^\[\]<>\x22\x00-\x20\x7F\p{Zs}\x{FFFD}]|\x00\d+[tc!]\x7F)+";
        let ext_link = Regex::new(&format!(
            r"\[((?i:{}){})(\p{{Zs}}*)([^\]\n]*)\]",
            protocols, url
        ))?;
        let free_link = Regex::new(&format!(
            r"(?i:\b(?:{}))[^\[\]<>\x22\x00-\x20\x7F\p{{Zs}}\x{{FFFD}}]+",
            free_protocols
        ))?;
        let protocol_start = Regex::new(&format!(r"^(?i:{})", protocols))?;

        let double_underscore = Regex::new(&format!(
            r"(?i)__({})__",
            alternation(settings.double_underscore.iter())
        ))?;

        let mut namespaces = HashMap::new();
        for (index, ns) in settings.namespaces.iter().enumerate() {
            if !ns.name.is_empty() {
                namespaces.insert(normalize_key(&ns.name), index);
            }
            for alias in &ns.aliases {
                namespaces.insert(normalize_key(alias), index);
            }
        }

        Ok(Self {
            comment_and_ext,
            ext_close,
            html,
            ext_link,
            free_link,
            protocol_start,
            double_underscore,
            parser_functions: settings
                .parser_functions
                .iter()
                .map(|f| f.to_lowercase())
                .collect(),
            variables: settings.variables.iter().cloned().collect(),
            wikitext_ext: settings
                .wikitext_ext
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
            variants: settings.variants.iter().map(|v| v.to_lowercase()).collect(),
            namespaces,
        })
    }
}

/// Compiled parser configuration, read-only during parsing
#[derive(Debug, Clone)]
pub struct Config {
    settings: Settings,
    patterns: Patterns,
}

impl Config {
    /// Compile a configuration from its settings
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let patterns = Patterns::compile(&settings)?;
        Ok(Self { settings, patterns })
    }

    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        Self::from_settings(settings)
    }

    /// Load a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The shared built-in configuration
    pub fn shared_default() -> Arc<Config> {
        Arc::clone(&DEFAULT_CONFIG)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn patterns(&self) -> &Patterns {
        &self.patterns
    }

    pub fn is_ext(&self, name: &str) -> bool {
        self.patterns.ext_close.contains_key(&name.to_lowercase())
            && !INCLUDE_TAGS.contains(&name.to_lowercase().as_str())
    }

    /// Whether the body of extension tag `name` is parsed as wikitext
    pub fn is_wikitext_ext(&self, name: &str) -> bool {
        self.patterns.wikitext_ext.contains(&name.to_lowercase())
    }

    pub fn is_parser_function(&self, name: &str) -> bool {
        self.patterns.parser_functions.contains(&name.to_lowercase())
    }

    pub fn is_variable(&self, name: &str) -> bool {
        self.patterns.variables.contains(name)
    }

    pub fn is_variant(&self, name: &str) -> bool {
        self.patterns.variants.contains(&name.to_lowercase())
    }

    /// Look a namespace up by name or alias (case- and underscore-insensitive)
    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.patterns
            .namespaces
            .get(&normalize_key(name))
            .and_then(|&i| self.settings.namespaces.get(i))
    }

    pub fn namespace_by_id(&self, id: i32) -> Option<&Namespace> {
        self.settings.namespaces.iter().find(|ns| ns.id == id)
    }

    /// Whether `text` begins with a configured URL protocol
    pub fn starts_with_protocol(&self, text: &str) -> bool {
        self.patterns.protocol_start.is_match(text)
    }
}

impl Default for Config {
    fn default() -> Self {
        (*DEFAULT_CONFIG).as_ref().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = Config::shared_default();
        assert!(config.is_ext("ref"));
        assert!(config.is_ext("REF"));
        assert!(!config.is_ext("noinclude"));
        assert!(config.is_wikitext_ext("ref"));
        assert!(!config.is_wikitext_ext("nowiki"));
        assert!(config.is_parser_function("#if"));
        assert!(config.is_parser_function("LC"));
        assert!(config.is_variable("PAGENAME"));
        assert!(!config.is_variable("pagename"));
    }

    #[test]
    fn resolves_namespace_aliases() {
        let config = Config::shared_default();
        assert_eq!(config.namespace("image").map(|ns| ns.id), Some(6));
        assert_eq!(config.namespace("user_talk").map(|ns| ns.id), Some(3));
        assert_eq!(config.namespace("Nope"), None);
        assert_eq!(config.namespace_by_id(14).map(|ns| ns.name.as_str()), Some("Category"));
    }

    #[test]
    fn detects_protocols() {
        let config = Config::shared_default();
        assert!(config.starts_with_protocol("https://example.org"));
        assert!(config.starts_with_protocol("MAILTO:a@b"));
        assert!(!config.starts_with_protocol("Main Page"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(Config::from_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn custom_settings_compile() {
        let mut settings = Config::shared_default().settings().clone();
        settings.ext.push("mytag".to_string());
        let config = Config::from_settings(settings).unwrap();
        assert!(config.is_ext("mytag"));
    }
}
