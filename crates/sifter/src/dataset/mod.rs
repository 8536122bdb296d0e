//! In-memory tabular dataset: ordered named columns of nullable values.

mod column;
mod table;
mod value;

pub use column::{Column, ColumnType};
pub use table::Dataset;
pub use value::Value;
