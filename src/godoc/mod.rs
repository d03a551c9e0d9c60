//! Go documentation extraction
//!
//! Parses Go sources with tree-sitter and builds the documentation model.

pub mod builder;
pub mod comments;
pub mod constants;
pub mod examples;
pub mod parser;
pub mod reader;
pub mod resolver;

pub use builder::{BuildRequest, Builder, BuilderOptions, ManifestFile, ManifestTieBreak};
pub use parser::{GoParser, ParsedFile};
