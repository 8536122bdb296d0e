//! Column normalization, filtering, renaming, merging and null filling.

mod engine;
mod naming;
mod operations;

pub use engine::{TransformEngine, missing_merge_columns};
pub use naming::{FALLBACK_COLUMN_NAME, MAX_COLUMN_NAME_LEN, clean_colname, clean_colnames};
pub use operations::{
    MissingColumnPolicy, RenamePolicy, RenameRule, TransformChange, TransformOperation,
    TransformResult,
};
