//! The expected-schema contract checked before value-rewriting stages.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{Result, SifterError};

/// Columns a dataset must carry once names are final.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaContract {
    /// Required column names, in the order they are reported.
    #[serde(default)]
    pub required_columns: Vec<String>,
}

impl SchemaContract {
    /// Create a contract requiring the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().require(columns)
    }

    /// Add more required columns. Duplicates are ignored.
    pub fn require<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all: IndexSet<String> = self.required_columns.drain(..).collect();
        all.extend(columns.into_iter().map(Into::into));
        self.required_columns = all.into_iter().collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.required_columns.is_empty()
    }

    /// Required columns absent from `data`, in contract order.
    pub fn missing(&self, data: &Dataset) -> Vec<String> {
        self.required_columns
            .iter()
            .filter(|c| !data.has_column(c))
            .cloned()
            .collect()
    }

    /// Fail with every missing column listed at once.
    pub fn validate(&self, data: &Dataset) -> Result<()> {
        let missing = self.missing(data);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SifterError::MissingColumns {
                stage: "schema contract".to_string(),
                columns: missing,
            })
        }
    }
}
