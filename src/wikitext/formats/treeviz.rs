//! Treeviz: one line per node, two spaces of indentation per level
//!
//! Tokens print their type, followed by their derived name in parentheses
//! when they have one. Text nodes print as quoted, escaped strings cut to
//! 40 characters.
//!
//! ```text
//! root
//!   template (Template:Tpl)
//!     template-name
//!       "tpl"
//!     parameter (1)
//! ```

use super::registry::{FormatError, Formatter};
use crate::wikitext::ast::{NodeSnapshot, Tree};

const MAX_LABEL: usize = 40;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn format_snapshot(snapshot: &NodeSnapshot, depth: usize, output: &mut String) {
    output.push_str(&"  ".repeat(depth));
    if snapshot.node_type == "text" {
        output.push_str(&format!("{:?}", truncate(&snapshot.label, MAX_LABEL)));
    } else {
        output.push_str(&snapshot.node_type);
        if !snapshot.label.is_empty() {
            output.push_str(&format!(" ({})", snapshot.label));
        }
    }
    output.push('\n');
    for child in &snapshot.children {
        format_snapshot(child, depth + 1, output);
    }
}

/// Treeviz dump of the whole tree
pub fn to_treeviz_str(tree: &Tree) -> String {
    let mut output = String::new();
    format_snapshot(&tree.snapshot(tree.root()), 0, &mut output);
    output
}

pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, tree: &Tree) -> Result<String, FormatError> {
        Ok(to_treeviz_str(tree))
    }

    fn description(&self) -> &str {
        "One line per node, indented by depth"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }

    #[test]
    fn test_format_nested_snapshot() {
        let mut root = NodeSnapshot::new("root", "");
        let mut heading = NodeSnapshot::new("heading", "2");
        heading.children.push(NodeSnapshot::new("text", "a\tb"));
        root.children.push(heading);

        let mut output = String::new();
        format_snapshot(&root, 0, &mut output);
        assert_eq!(output, "root\n  heading (2)\n    \"a\\tb\"\n");
    }
}
