//! JSON output: the snapshot of the root, pretty printed

use super::registry::{FormatError, Formatter};
use crate::wikitext::ast::Tree;

pub fn to_json_str(tree: &Tree) -> Result<String, FormatError> {
    serde_json::to_string_pretty(&tree.snapshot(tree.root()))
        .map_err(|e| FormatError::SerializationError(e.to_string()))
}

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, tree: &Tree) -> Result<String, FormatError> {
        to_json_str(tree)
    }

    fn description(&self) -> &str {
        "Node snapshots as JSON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wikitext::ast::NodeSnapshot;
    use crate::wikitext::parsing::parse;

    #[test]
    fn test_json_reads_back() {
        let tree = parse("== a ==", false, 11).unwrap();
        let json = to_json_str(&tree).unwrap();
        let snapshot: NodeSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot.node_type, "root");
        assert_eq!(snapshot.children[0].node_type, "heading");
        assert_eq!(snapshot.children[0].attributes.get("level").map(String::as_str), Some("2"));
    }
}
