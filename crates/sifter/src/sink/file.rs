//! Flat-file sink.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tracing::info;

use crate::dataset::Dataset;
use crate::error::{Result, SifterError};

/// Writes a dataset to a single delimited file with a header row,
/// replacing any existing file.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write the dataset, returning the number of data rows written.
    /// Nulls are written as empty fields.
    pub fn write(&self, dataset: &Dataset) -> Result<u64> {
        let path = self.path.as_path();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| SifterError::io(parent, e))?;
            }
        }

        let file = File::create(path).map_err(|e| SifterError::io(path, e))?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b',')
            .from_writer(BufWriter::new(file));

        writer.write_record(dataset.column_names())?;
        let mut written = 0u64;
        for row in dataset.rows() {
            writer.write_record(row.iter().map(|v| v.to_text().unwrap_or_default()))?;
            written += 1;
        }

        let mut inner = writer
            .into_inner()
            .map_err(|e| SifterError::io(path, e.into_error()))?;
        inner.flush().map_err(|e| SifterError::io(path, e))?;

        info!(path = %path.display(), rows = written, "Wrote CSV output");
        Ok(written)
    }
}
