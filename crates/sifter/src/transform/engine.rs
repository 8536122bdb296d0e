//! Transformation engine that runs cleaning operations over a dataset.

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, warn};

use crate::dataset::{Dataset, Value};
use crate::error::{Result, SifterError};
use crate::schema::SchemaContract;

use super::naming::clean_colnames;
use super::operations::{
    MissingColumnPolicy, RenamePolicy, RenameRule, TransformChange, TransformOperation,
    TransformResult,
};

/// Engine for applying transformation operations to a dataset.
///
/// Every operation consumes the current dataset and returns the next one.
pub struct TransformEngine;

impl TransformEngine {
    /// Create a new transform engine.
    pub fn new() -> Self {
        Self
    }

    /// Apply operations in order. The first failing operation aborts the run.
    pub fn apply(
        &self,
        operations: &[TransformOperation],
        data: Dataset,
    ) -> Result<(Dataset, TransformResult)> {
        let mut result = TransformResult::new();
        let mut data = data;

        for operation in operations {
            debug!(stage = operation.stage(), "{}", operation.description());
            let (next, change) = self.apply_operation(operation, data)?;
            info!(
                stage = operation.stage(),
                rows = next.row_count(),
                columns = next.column_count(),
                "{}",
                change.description
            );
            result.add_change(change);
            data = next;
        }

        Ok((data, result))
    }

    /// Apply a single operation.
    pub fn apply_operation(
        &self,
        operation: &TransformOperation,
        data: Dataset,
    ) -> Result<(Dataset, TransformChange)> {
        match operation {
            TransformOperation::NormalizeNames => self.apply_normalize_names(operation, data),
            TransformOperation::DropEmptyColumns => self.apply_drop_empty(operation, data),
            TransformOperation::RenameByPrefix { rules, policy } => {
                self.apply_rename(operation, rules, *policy, data)
            }
            TransformOperation::ValidateSchema { contract } => {
                self.apply_validate(operation, contract, data)
            }
            TransformOperation::DropHeaderRows { column, marker } => {
                self.apply_drop_header_rows(operation, column, marker, data)
            }
            TransformOperation::MergeColumns {
                groups,
                separator,
                policy,
            } => self.apply_merge(operation, groups, separator, *policy, data),
            TransformOperation::EmptyToNull => self.apply_empty_to_null(operation, data),
            TransformOperation::FillNulls { defaults } => {
                self.apply_fill_nulls(operation, defaults, data)
            }
        }
    }

    fn apply_normalize_names(
        &self,
        operation: &TransformOperation,
        mut data: Dataset,
    ) -> Result<(Dataset, TransformChange)> {
        let original: Vec<String> = data.column_names().into_iter().map(String::from).collect();
        let cleaned = clean_colnames(&original);

        let mut renamed = Vec::new();
        for (column, name) in data.columns_mut().iter_mut().zip(cleaned) {
            if column.name != name {
                debug!(from = %column.name, to = %name, "Cleaned column name");
                column.name = name;
                renamed.push(column.name.clone());
            }
        }

        let mut change = TransformChange::new(
            operation,
            format!("Normalized {} of {} column name(s)", renamed.len(), original.len()),
        );
        change.columns = renamed;
        Ok((data, change))
    }

    fn apply_drop_empty(
        &self,
        operation: &TransformOperation,
        data: Dataset,
    ) -> Result<(Dataset, TransformChange)> {
        let empty: Vec<String> = data
            .columns()
            .iter()
            .filter(|c| c.is_all_null())
            .map(|c| c.name.clone())
            .collect();
        let data = data.retain_columns(|c| !c.is_all_null());

        let mut change = TransformChange::new(
            operation,
            format!("Dropped {} all-null column(s)", empty.len()),
        );
        change.columns_removed = empty.len();
        change.columns = empty;
        Ok((data, change))
    }

    fn apply_rename(
        &self,
        operation: &TransformOperation,
        rules: &[RenameRule],
        policy: RenamePolicy,
        mut data: Dataset,
    ) -> Result<(Dataset, TransformChange)> {
        let mut renamed = Vec::new();

        for rule in rules {
            let matches: Vec<String> = data
                .column_names()
                .into_iter()
                .filter(|name| name.starts_with(rule.prefix.as_str()))
                .map(String::from)
                .collect();

            let Some(first) = matches.first() else {
                debug!(prefix = %rule.prefix, "No column matches rename prefix");
                continue;
            };

            if matches.len() > 1 {
                match policy {
                    RenamePolicy::Strict => {
                        return Err(SifterError::AmbiguousRename {
                            prefix: rule.prefix.clone(),
                            matches,
                        });
                    }
                    RenamePolicy::First => {
                        warn!(
                            prefix = %rule.prefix,
                            matches = matches.len(),
                            "Several columns match rename prefix, renaming the first"
                        );
                    }
                }
            }

            data = data.rename_column(first, &rule.name)?;
            renamed.push(rule.name.clone());
        }

        let mut change = TransformChange::new(
            operation,
            format!("Renamed {} of {} prefix rule(s)", renamed.len(), rules.len()),
        );
        change.columns = renamed;
        Ok((data, change))
    }

    fn apply_validate(
        &self,
        operation: &TransformOperation,
        contract: &SchemaContract,
        data: Dataset,
    ) -> Result<(Dataset, TransformChange)> {
        contract.validate(&data)?;
        let change = TransformChange::new(
            operation,
            format!(
                "All {} required column(s) present",
                contract.required_columns.len()
            ),
        );
        Ok((data, change))
    }

    fn apply_drop_header_rows(
        &self,
        operation: &TransformOperation,
        column: &str,
        marker: &str,
        data: Dataset,
    ) -> Result<(Dataset, TransformChange)> {
        let Some(values) = data.column(column).map(|c| &c.values) else {
            let mut change = TransformChange::new(
                operation,
                format!("Column '{}' absent, no rows dropped", column),
            );
            change.skipped = true;
            return Ok((data, change));
        };

        // Null cells are kept: only a rendered value can contain the marker.
        let mask: Vec<bool> = values
            .iter()
            .map(|v| !v.to_text().is_some_and(|t| t.contains(marker)))
            .collect();
        let removed = mask.iter().filter(|&&keep| !keep).count();
        let data = data.retain_rows(&mask)?;

        let mut change = TransformChange::new(
            operation,
            format!("Dropped {} row(s) where '{}' contains '{}'", removed, column, marker),
        );
        change.rows_removed = removed;
        change.columns = vec![column.to_string()];
        Ok((data, change))
    }

    fn apply_merge(
        &self,
        operation: &TransformOperation,
        groups: &IndexMap<String, Vec<String>>,
        separator: &str,
        policy: MissingColumnPolicy,
        mut data: Dataset,
    ) -> Result<(Dataset, TransformChange)> {
        let missing = missing_merge_columns(groups, &data);
        if !missing.is_empty() {
            match policy {
                MissingColumnPolicy::Fail => {
                    return Err(SifterError::MissingColumns {
                        stage: operation.stage().to_string(),
                        columns: missing,
                    });
                }
                MissingColumnPolicy::Skip => {
                    warn!(columns = %missing.join(", "), "Merge columns absent, skipping them");
                }
            }
        }

        let mut merged = Vec::new();
        let mut to_drop: IndexSet<String> = IndexSet::new();
        let mut changed = 0;

        for (target, companions) in groups {
            if !data.has_column(target) {
                warn!(target = %target, "Merge target absent, group skipped");
                continue;
            }
            let present: Vec<&str> = companions
                .iter()
                .map(String::as_str)
                .filter(|c| data.has_column(c))
                .collect();

            let joined: Vec<Value> = (0..data.row_count())
                .map(|row| {
                    let parts: Vec<String> = std::iter::once(target.as_str())
                        .chain(present.iter().copied())
                        .filter_map(|name| data.get(row, name).and_then(Value::to_text))
                        .filter(|text| !text.is_empty())
                        .collect();
                    if parts.is_empty() {
                        Value::Null
                    } else {
                        Value::Text(parts.join(separator))
                    }
                })
                .collect();

            if let Some(column) = data.column_mut(target) {
                changed += column
                    .values
                    .iter()
                    .zip(&joined)
                    .filter(|(old, new)| old != new)
                    .count();
                column.values = joined;
            }

            merged.push(target.clone());
            to_drop.extend(present.iter().map(|c| c.to_string()));
        }

        // A column that is itself a merge target is never dropped.
        to_drop.retain(|c| !groups.contains_key(c));
        let dropped: Vec<String> = to_drop.into_iter().collect();
        let data = data.drop_columns(&dropped);

        let mut change = TransformChange::new(
            operation,
            format!(
                "Merged {} group(s), dropped {} companion column(s)",
                merged.len(),
                dropped.len()
            ),
        );
        change.values_changed = changed;
        change.columns_removed = dropped.len();
        change.columns = merged;
        Ok((data, change))
    }

    fn apply_empty_to_null(
        &self,
        operation: &TransformOperation,
        mut data: Dataset,
    ) -> Result<(Dataset, TransformChange)> {
        let mut changed = 0;
        let mut touched = Vec::new();

        for column in data.columns_mut() {
            let before = changed;
            for value in column.values.iter_mut().filter(|v| v.is_empty_text()) {
                *value = Value::Null;
                changed += 1;
            }
            if changed > before {
                touched.push(column.name.clone());
            }
        }

        let mut change = TransformChange::new(
            operation,
            format!("Converted {} empty string(s) to null", changed),
        );
        change.values_changed = changed;
        change.columns = touched;
        Ok((data, change))
    }

    fn apply_fill_nulls(
        &self,
        operation: &TransformOperation,
        defaults: &IndexMap<String, String>,
        mut data: Dataset,
    ) -> Result<(Dataset, TransformChange)> {
        let mut changed = 0;
        let mut filled = Vec::new();

        for (name, label) in defaults {
            let Some(column) = data.column_mut(name) else {
                debug!(column = %name, "Fill target absent");
                continue;
            };
            let mut count = 0;
            for value in column.values.iter_mut().filter(|v| v.is_null()) {
                *value = Value::text(label.as_str());
                count += 1;
            }
            if count > 0 {
                debug!(column = %name, count, label = %label, "Filled nulls");
                filled.push(name.clone());
            }
            changed += count;
        }

        let mut change = TransformChange::new(
            operation,
            format!("Filled {} null value(s) in {} column(s)", changed, filled.len()),
        );
        change.values_changed = changed;
        change.columns = filled;
        Ok((data, change))
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Every target or companion referenced by `groups` that `data` lacks.
pub fn missing_merge_columns(groups: &IndexMap<String, Vec<String>>, data: &Dataset) -> Vec<String> {
    let mut missing: IndexSet<String> = IndexSet::new();
    for (target, companions) in groups {
        for name in std::iter::once(target).chain(companions) {
            if !data.has_column(name) {
                missing.insert(name.clone());
            }
        }
    }
    missing.into_iter().collect()
}
