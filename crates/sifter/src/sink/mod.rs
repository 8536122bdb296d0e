//! Output sinks for the cleaned dataset.
//!
//! Both sinks overwrite their target. [`write_outputs`] runs the CSV write on
//! the blocking pool and the table write on the runtime at the same time, and
//! fails if either fails.

mod file;
mod sql;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use file::CsvSink;
pub use sql::{Dialect, SinkConfig, SqlSink};

use crate::config::OutputConfig;
use crate::dataset::Dataset;
use crate::error::{Result, SifterError};

/// Rows written per sink (None = sink not configured).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputReport {
    pub csv_rows: Option<u64>,
    pub database_rows: Option<u64>,
}

/// Write the dataset to every configured sink concurrently.
pub async fn write_outputs(dataset: Arc<Dataset>, output: &OutputConfig) -> Result<OutputReport> {
    let csv_write = async {
        match &output.csv {
            Some(path) => {
                let sink = CsvSink::new(path.clone());
                let data = Arc::clone(&dataset);
                let rows = tokio::task::spawn_blocking(move || sink.write(&data)).await??;
                Ok::<_, SifterError>(Some(rows))
            }
            None => {
                debug!("No CSV output configured");
                Ok(None)
            }
        }
    };

    let database_write = async {
        match &output.database {
            Some(config) => SqlSink::new(config.clone()).write(&dataset).await.map(Some),
            None => {
                debug!("No database output configured");
                Ok(None)
            }
        }
    };

    let (csv_rows, database_rows) = tokio::try_join!(csv_write, database_write)?;
    Ok(OutputReport {
        csv_rows,
        database_rows,
    })
}
