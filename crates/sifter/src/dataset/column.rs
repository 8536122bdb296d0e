//! Named columns and their derived types.

use serde::{Deserialize, Serialize};

use super::value::Value;

/// Type of a column, derived from its non-null values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Whole numbers.
    Integer,
    /// Floating-point numbers.
    Float,
    /// Text values.
    String,
    /// No non-null value to infer from.
    Null,
}

impl ColumnType {
    /// Smallest type able to hold values of both `self` and `other`.
    ///
    /// `Null` is the identity; integers widen to floats; anything mixed with
    /// text becomes text.
    pub fn widen(self, other: ColumnType) -> ColumnType {
        use ColumnType::*;
        match (self, other) {
            (Null, t) | (t, Null) => t,
            (Integer, Integer) => Integer,
            (Integer, Float) | (Float, Integer) | (Float, Float) => Float,
            _ => String,
        }
    }

    /// Infer the type of a raw (unparsed) field. Empty fields are `Null`.
    pub fn infer(raw: &str) -> ColumnType {
        if raw.is_empty() {
            ColumnType::Null
        } else if raw.parse::<i64>().is_ok() {
            ColumnType::Integer
        } else if raw.parse::<f64>().is_ok() && raw.bytes().any(|b| b.is_ascii_digit()) {
            // The digit check keeps words like "inf" and "NaN" as text.
            ColumnType::Float
        } else {
            ColumnType::String
        }
    }
}

impl Default for ColumnType {
    fn default() -> Self {
        ColumnType::Null
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::String => write!(f, "string"),
            ColumnType::Null => write!(f, "null"),
        }
    }
}

/// A named sequence of cell values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of non-null values.
    pub fn non_null_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_null()).count()
    }

    /// True when no value in the column is non-null.
    pub fn is_all_null(&self) -> bool {
        self.values.iter().all(Value::is_null)
    }

    /// Derive the column type by widening over every non-null value.
    pub fn column_type(&self) -> ColumnType {
        self.values
            .iter()
            .fold(ColumnType::Null, |acc, v| acc.widen(v.value_type()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen() {
        assert_eq!(ColumnType::Null.widen(ColumnType::Integer), ColumnType::Integer);
        assert_eq!(ColumnType::Integer.widen(ColumnType::Float), ColumnType::Float);
        assert_eq!(ColumnType::Float.widen(ColumnType::String), ColumnType::String);
        assert_eq!(ColumnType::Integer.widen(ColumnType::Integer), ColumnType::Integer);
    }

    #[test]
    fn test_infer_raw() {
        assert_eq!(ColumnType::infer(""), ColumnType::Null);
        assert_eq!(ColumnType::infer("-12"), ColumnType::Integer);
        assert_eq!(ColumnType::infer("3.5"), ColumnType::Float);
        assert_eq!(ColumnType::infer("Yes"), ColumnType::String);
    }

    #[test]
    fn test_column_type_mixed() {
        let col = Column::new(
            "age",
            vec![Value::Null, Value::Integer(30), Value::text("N/A")],
        );
        assert_eq!(col.column_type(), ColumnType::String);
        assert_eq!(col.non_null_count(), 2);
        assert!(!col.is_all_null());
    }

    #[test]
    fn test_all_null_column() {
        let col = Column::new("c3", vec![Value::Null, Value::Null]);
        assert!(col.is_all_null());
        assert_eq!(col.column_type(), ColumnType::Null);
    }
}
