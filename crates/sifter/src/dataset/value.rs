//! Cell values.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::column::ColumnType;

/// A single cell. `Null` is the null marker and is distinct from `Text("")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Build a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Parse a raw field according to an inferred column type.
    ///
    /// Empty fields are null regardless of type. A field that does not parse
    /// as the requested type is kept as text.
    pub fn parse(raw: &str, column_type: ColumnType) -> Self {
        if raw.is_empty() {
            return Value::Null;
        }
        match column_type {
            ColumnType::Integer => raw
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::text(raw)),
            ColumnType::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or_else(|_| Value::text(raw)),
            ColumnType::String | ColumnType::Null => Value::text(raw),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for `Text("")`. Null is not an empty string.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Value::Text(s) if s.is_empty())
    }

    /// The type this single value implies.
    pub fn value_type(&self) -> ColumnType {
        match self {
            Value::Null => ColumnType::Null,
            Value::Integer(_) => ColumnType::Integer,
            Value::Float(_) => ColumnType::Float,
            Value::Text(_) => ColumnType::String,
        }
    }

    /// Render the value as text, or `None` for null.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(i) => write!(f, "{}", i),
            // Whole floats keep a fractional digit so they read back as floats.
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_is_null() {
        assert_eq!(Value::parse("", ColumnType::String), Value::Null);
        assert_eq!(Value::parse("", ColumnType::Integer), Value::Null);
    }

    #[test]
    fn test_parse_typed() {
        assert_eq!(Value::parse("42", ColumnType::Integer), Value::Integer(42));
        assert_eq!(Value::parse("1.5", ColumnType::Float), Value::Float(1.5));
        assert_eq!(Value::parse("42", ColumnType::String), Value::text("42"));
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Value::Null.to_text(), None);
        assert_eq!(Value::Integer(7).to_text().as_deref(), Some("7"));
        assert_eq!(Value::Float(2.0).to_text().as_deref(), Some("2.0"));
        assert_eq!(Value::Float(2.25).to_text().as_deref(), Some("2.25"));
        assert_eq!(Value::text("").to_text().as_deref(), Some(""));
    }

    #[test]
    fn test_null_is_not_empty_text() {
        assert!(!Value::Null.is_empty_text());
        assert!(Value::text("").is_empty_text());
        assert!(!Value::text("").is_null());
    }
}
