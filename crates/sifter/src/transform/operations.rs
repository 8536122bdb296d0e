//! Transformation operations that make up a cleaning pipeline.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::SchemaContract;

/// Rename the first column whose name starts with `prefix` to `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRule {
    pub prefix: String,
    pub name: String,
}

impl RenameRule {
    pub fn new(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
        }
    }
}

/// What to do when more than one column matches a rename prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenamePolicy {
    /// Rename the first match in column order, leave the rest.
    #[default]
    First,
    /// Treat more than one match as a broken schema assumption.
    Strict,
}

/// What to do when a merge group references a column that is not present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingColumnPolicy {
    /// Abort with every missing column listed.
    #[default]
    Fail,
    /// Ignore absent companions; skip groups whose target is absent.
    Skip,
}

/// A transformation operation to apply to a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformOperation {
    /// Clean every column label and make the results unique.
    NormalizeNames,

    /// Drop columns that contain no non-null value.
    DropEmptyColumns,

    /// Rename columns by prefix match.
    RenameByPrefix {
        rules: Vec<RenameRule>,
        policy: RenamePolicy,
    },

    /// Fail unless every contract column is present.
    ValidateSchema { contract: SchemaContract },

    /// Drop rows whose `column` value contains `marker`. Skipped when the
    /// column is absent.
    DropHeaderRows { column: String, marker: String },

    /// Join each target with its companion columns, then drop the companions.
    MergeColumns {
        groups: IndexMap<String, Vec<String>>,
        separator: String,
        policy: MissingColumnPolicy,
    },

    /// Turn every empty string into null.
    EmptyToNull,

    /// Replace nulls with a per-column default label.
    FillNulls { defaults: IndexMap<String, String> },
}

impl TransformOperation {
    /// Short stable name of the stage.
    pub fn stage(&self) -> &'static str {
        match self {
            TransformOperation::NormalizeNames => "normalize_names",
            TransformOperation::DropEmptyColumns => "drop_empty_columns",
            TransformOperation::RenameByPrefix { .. } => "rename_by_prefix",
            TransformOperation::ValidateSchema { .. } => "validate_schema",
            TransformOperation::DropHeaderRows { .. } => "drop_header_rows",
            TransformOperation::MergeColumns { .. } => "merge_columns",
            TransformOperation::EmptyToNull => "empty_to_null",
            TransformOperation::FillNulls { .. } => "fill_nulls",
        }
    }

    /// Get a human-readable description of the operation.
    pub fn description(&self) -> String {
        match self {
            TransformOperation::NormalizeNames => "Normalize column names".to_string(),
            TransformOperation::DropEmptyColumns => "Drop all-null columns".to_string(),
            TransformOperation::RenameByPrefix { rules, policy } => {
                format!("Rename by {} prefix rule(s) ({:?} policy)", rules.len(), policy)
            }
            TransformOperation::ValidateSchema { contract } => format!(
                "Check {} required column(s)",
                contract.required_columns.len()
            ),
            TransformOperation::DropHeaderRows { column, marker } => {
                format!("Drop rows where '{}' contains '{}'", column, marker)
            }
            TransformOperation::MergeColumns { groups, separator, .. } => {
                let targets: Vec<&str> = groups.keys().map(String::as_str).collect();
                format!("Merge into {} with '{}'", targets.join(", "), separator)
            }
            TransformOperation::EmptyToNull => "Convert empty strings to null".to_string(),
            TransformOperation::FillNulls { defaults } => {
                format!("Fill nulls in {} column(s)", defaults.len())
            }
        }
    }
}

/// Result of applying a sequence of operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformResult {
    /// Number of operations applied.
    pub operations_applied: usize,

    /// Number of cell values rewritten.
    pub values_changed: usize,

    /// Number of rows removed.
    pub rows_removed: usize,

    /// Number of columns removed.
    pub columns_removed: usize,

    /// Detailed changes for each operation.
    pub changes: Vec<TransformChange>,
}

/// What one operation did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformChange {
    /// Stage name (see [`TransformOperation::stage`]).
    pub stage: String,

    /// Description of the change.
    pub description: String,

    /// Columns renamed, dropped, merged or filled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,

    /// Number of values changed.
    pub values_changed: usize,

    /// Number of rows removed.
    pub rows_removed: usize,

    /// Number of columns removed.
    pub columns_removed: usize,

    /// True when the stage did nothing because its precondition was absent.
    #[serde(default)]
    pub skipped: bool,
}

impl TransformChange {
    pub fn new(operation: &TransformOperation, description: impl Into<String>) -> Self {
        Self {
            stage: operation.stage().to_string(),
            description: description.into(),
            ..Self::default()
        }
    }
}

impl TransformResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a change to the result.
    pub fn add_change(&mut self, change: TransformChange) {
        self.operations_applied += 1;
        self.values_changed += change.values_changed;
        self.rows_removed += change.rows_removed;
        self.columns_removed += change.columns_removed;
        self.changes.push(change);
    }

    /// Find the change recorded for a stage.
    pub fn change(&self, stage: &str) -> Option<&TransformChange> {
        self.changes.iter().find(|c| c.stage == stage)
    }
}
