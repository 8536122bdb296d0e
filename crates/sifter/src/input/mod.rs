//! Input parsing and data source handling.

mod parser;
mod source;

pub use parser::{Parser, ParserConfig, safe_headers};
pub use source::SourceMetadata;
