//! The `Dataset` container.

use std::collections::HashSet;

use crate::error::{Result, SifterError};

use super::column::Column;
use super::value::Value;

/// An ordered sequence of uniquely named columns sharing one row count.
///
/// Rows are positional only. Stages consume a dataset and return a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset from columns, checking that names are unique and that
    /// every column has the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        Self::with_row_count(columns, row_count)
    }

    /// Build a dataset with an explicit row count (needed when there are no
    /// columns left to carry it).
    pub fn with_row_count(columns: Vec<Column>, row_count: usize) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SifterError::Schema(format!(
                    "Duplicate column name '{}'",
                    column.name
                )));
            }
            if column.len() != row_count {
                return Err(SifterError::Schema(format!(
                    "Column '{}' has {} values, expected {}",
                    column.name,
                    column.len(),
                    row_count
                )));
            }
        }
        Ok(Self { columns, row_count })
    }

    /// Build a dataset from headers and row-major values.
    ///
    /// Short rows are padded with nulls and long rows truncated.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let row_count = rows.len();
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(row_count)))
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.values.push(cells.next().unwrap_or(Value::Null));
            }
        }

        Self::with_row_count(columns, row_count)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).and_then(|c| c.values.get(row))
    }

    /// Values of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// Iterate over rows, in order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count).map(move |i| self.columns.iter().map(|c| &c.values[i]).collect())
    }

    /// Rename a column in place, keeping its position.
    pub fn rename_column(mut self, from: &str, to: &str) -> Result<Self> {
        if from == to {
            return Ok(self);
        }
        if self.has_column(to) {
            return Err(SifterError::Schema(format!(
                "Cannot rename '{}' to '{}': a column with that name already exists",
                from, to
            )));
        }
        let column = self.column_mut(from).ok_or_else(|| SifterError::MissingColumns {
            stage: "rename".to_string(),
            columns: vec![from.to_string()],
        })?;
        column.name = to.to_string();
        Ok(self)
    }

    /// Keep only the columns for which `keep` returns true, preserving order.
    pub fn retain_columns(mut self, mut keep: impl FnMut(&Column) -> bool) -> Self {
        self.columns.retain(|c| keep(c));
        self
    }

    /// Drop the named columns. Names that are not present are ignored.
    pub fn drop_columns<S: AsRef<str>>(self, names: &[S]) -> Self {
        let dropped: HashSet<&str> = names.iter().map(|n| n.as_ref()).collect();
        self.retain_columns(|c| !dropped.contains(c.name.as_str()))
    }

    /// Keep only rows whose mask entry is true.
    pub fn retain_rows(mut self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.row_count {
            return Err(SifterError::Schema(format!(
                "Row mask has {} entries, expected {}",
                mask.len(),
                self.row_count
            )));
        }
        for column in self.columns.iter_mut() {
            let mut keep = mask.iter();
            column.values.retain(|_| *keep.next().unwrap_or(&false));
        }
        self.row_count = mask.iter().filter(|&&k| k).count();
        Ok(self)
    }

    /// Render the first `n` rows as a text table with untruncated cells.
    pub fn preview(&self, n: usize) -> String {
        let shown = n.min(self.row_count);
        let mut widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| c.name.chars().count())
            .collect();
        let cells: Vec<Vec<String>> = (0..shown)
            .map(|i| {
                self.columns
                    .iter()
                    .map(|c| c.values[i].to_string())
                    .collect()
            })
            .collect();
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let border: String = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("+");
        let border = format!("+{}+\n", border);
        let line = |values: Vec<&str>| -> String {
            let padded: Vec<String> = values
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!("{}{}", v, " ".repeat(w - v.chars().count())))
                .collect();
            format!("|{}|\n", padded.join("|"))
        };

        let mut out = String::new();
        out.push_str(&border);
        out.push_str(&line(self.column_names()));
        out.push_str(&border);
        for row in &cells {
            out.push_str(&line(row.iter().map(String::as_str).collect()));
        }
        out.push_str(&border);
        if self.row_count > shown {
            out.push_str(&format!("only showing top {} rows\n", shown));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_rows(
            vec!["id".into(), "answer".into(), "blank".into()],
            vec![
                vec![Value::Integer(1), "Yes".into(), Value::Null],
                vec![Value::Integer(2), "No".into(), Value::Null],
                vec![Value::Integer(3), Value::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let data = sample();
        assert_eq!(data.row_count(), 3);
        assert_eq!(data.column_count(), 3);
        assert_eq!(data.get(2, "answer"), Some(&Value::Null));
        assert_eq!(data.get(0, "id"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = Dataset::new(vec![
            Column::new("a", vec![Value::Null]),
            Column::new("a", vec![Value::Null]),
        ]);
        assert!(matches!(result, Err(SifterError::Schema(_))));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = Dataset::new(vec![
            Column::new("a", vec![Value::Null]),
            Column::new("b", vec![]),
        ]);
        assert!(matches!(result, Err(SifterError::Schema(_))));
    }

    #[test]
    fn test_rename_keeps_position() {
        let data = sample().rename_column("answer", "reply").unwrap();
        assert_eq!(data.column_names(), vec!["id", "reply", "blank"]);
    }

    #[test]
    fn test_rename_onto_existing_fails() {
        let result = sample().rename_column("answer", "id");
        assert!(matches!(result, Err(SifterError::Schema(_))));
    }

    #[test]
    fn test_drop_columns_ignores_absent() {
        let data = sample().drop_columns(&["blank", "nope"]);
        assert_eq!(data.column_names(), vec!["id", "answer"]);
        assert_eq!(data.row_count(), 3);
    }

    #[test]
    fn test_retain_rows() {
        let data = sample().retain_rows(&[true, false, true]).unwrap();
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.get(1, "id"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_row_count_survives_dropping_all_columns() {
        let data = sample().retain_columns(|_| false);
        assert_eq!(data.column_count(), 0);
        assert_eq!(data.row_count(), 3);
    }

    #[test]
    fn test_preview() {
        let preview = sample().preview(2);
        let lines: Vec<&str> = preview.lines().collect();
        assert_eq!(lines[0], "+--+------+-----+");
        assert_eq!(lines[1], "|id|answer|blank|");
        assert_eq!(lines[3], "|1 |Yes   |null |");
        assert_eq!(lines.last(), Some(&"only showing top 2 rows"));
    }
}
