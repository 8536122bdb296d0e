//! Sifter: cleaning pipeline for wide survey exports.
//!
//! Sifter loads a delimited file with a header row, runs a fixed sequence of
//! cleaning stages over it, and writes the result to a CSV file and a
//! relational table.
//!
//! # Stages
//!
//! 1. Normalize column names to `[a-z0-9_]` tokens
//! 2. Drop columns with no values
//! 3. Rename long question columns by prefix
//! 4. Drop repeated header rows
//! 5. Check the expected columns are present
//! 6. Merge multi-answer questions into one column
//! 7. Turn empty strings into nulls
//! 8. Fill nulls with per-column labels
//!
//! # Example
//!
//! ```no_run
//! use sifter::Pipeline;
//!
//! let pipeline = Pipeline::new();
//! let outcome = pipeline.run("StarWars.csv").unwrap();
//!
//! println!("Rows: {}", outcome.dataset.row_count());
//! println!("{}", outcome.dataset.preview(5));
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod input;
pub mod schema;
pub mod sink;
pub mod transform;

mod pipeline;

pub use crate::pipeline::{Pipeline, PipelineOutcome, PipelineSummary};
pub use config::{HeaderFilterConfig, OutputConfig, PipelineConfig};
pub use dataset::{Column, ColumnType, Dataset, Value};
pub use error::{Result, SifterError};
pub use input::{Parser, ParserConfig, SourceMetadata};
pub use schema::SchemaContract;
pub use sink::{CsvSink, Dialect, OutputReport, SinkConfig, SqlSink, write_outputs};
pub use transform::{
    MissingColumnPolicy, RenamePolicy, RenameRule, TransformEngine, TransformOperation,
    TransformResult,
};
