//! Staged, placeholder-driven parsing
//!
//! Parsing never recurses over the grammar. The root token starts with the
//! whole document as one text child; each of the [`MAX_STAGE`] stages scans
//! every pending container for one construct family, constructs a token for
//! each occurrence and splices a sentinel into the text in its place. When
//! the stages are done, the build phase swaps sentinels back for the tokens they
//! stand for.
//!
//! ```text
//! "{{a|[[b]]}}"  --stage 1-->  "\00t\x7F"           accumulator: [template, name, param, key, value]
//! value "[[b]]"  --stage 5-->  "\05l\x7F"           accumulator: [..., link, target]
//! build          -->           root > template > (name, param > (key, value > link))
//! ```
//!
//! The whole pipeline runs with the tree in trusted mode; acceptance checks
//! and events only apply to edits made after parsing.

mod accumulator;
mod build;
pub mod context;
mod engine;
pub mod error;
pub mod sentinel;
pub mod stages;

pub use accumulator::Accumulator;
pub use context::BuildContext;
pub use engine::{parse, parse_with, ParseOptions, ParseSession};
pub use error::{ParseError, ParseErrorKind};
pub use sentinel::SentinelKind;
pub use stages::{Recognizer, MAX_STAGE};
