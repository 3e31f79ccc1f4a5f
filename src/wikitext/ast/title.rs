//! Page title normalization

use crate::wikitext::config::Config;

/// Normalize a raw page title the way the wiki resolves it
///
/// Underscores become spaces, whitespace runs collapse, a `#fragment` is cut,
/// a known namespace prefix is canonicalized and the first letter of the page
/// part is uppercased. Titles without a namespace prefix land in
/// `default_namespace`. A leading `:` forces the main namespace.
pub fn normalize_title(raw: &str, default_namespace: i32, config: &Config) -> String {
    let mut title: String = raw
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if let Some(hash) = title.find('#') {
        title.truncate(hash);
        title = title.trim_end().to_string();
    }

    let mut namespace = default_namespace;
    if let Some(rest) = title.strip_prefix(':') {
        namespace = 0;
        title = rest.trim_start().to_string();
    }

    if let Some((prefix, rest)) = title.split_once(':') {
        if let Some(ns) = config.namespace(prefix.trim()) {
            namespace = ns.id;
            title = rest.trim().to_string();
        }
    }

    let page = capitalize(&title);
    match config.namespace_by_id(namespace) {
        Some(ns) if !ns.name.is_empty() => format!("{}:{}", ns.name, page),
        _ => page,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
