//! Output formats for parsed trees
//!
//! - `treeviz`: one line per node, indented by depth
//! - `json`: the [`NodeSnapshot`](crate::wikitext::ast::NodeSnapshot) tree as JSON
//! - `roundtrip`: the serialized source, which equals the parsed input

pub mod json;
pub mod registry;
pub mod treeviz;

pub use json::{to_json_str, JsonFormatter};
pub use registry::{FormatError, FormatRegistry, Formatter, RoundtripFormatter};
pub use treeviz::{to_treeviz_str, TreevizFormatter};
