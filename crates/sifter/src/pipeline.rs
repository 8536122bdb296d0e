//! Main Pipeline struct and public API.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PipelineConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::input::{Parser, SourceMetadata};
use crate::sink::{write_outputs, OutputReport};
use crate::transform::{TransformEngine, TransformResult};

/// Outcome of loading and cleaning one file.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Metadata about the source file.
    pub source: SourceMetadata,
    /// The cleaned dataset.
    pub dataset: Dataset,
    /// What each stage did.
    pub result: TransformResult,
}

/// Serializable summary of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub source: SourceMetadata,
    pub rows: usize,
    pub columns: Vec<String>,
    pub rows_removed: usize,
    pub columns_removed: usize,
    pub values_changed: usize,
    pub transform: TransformResult,
}

impl PipelineOutcome {
    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            source: self.source.clone(),
            rows: self.dataset.row_count(),
            columns: self
                .dataset
                .column_names()
                .into_iter()
                .map(String::from)
                .collect(),
            rows_removed: self.result.rows_removed,
            columns_removed: self.result.columns_removed,
            values_changed: self.result.values_changed,
            transform: self.result.clone(),
        }
    }
}

/// Load, clean and store a survey export.
pub struct Pipeline {
    config: PipelineConfig,
    parser: Parser,
    engine: TransformEngine,
}

impl Pipeline {
    /// Create a pipeline with the default configuration.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with a custom configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        Self {
            config,
            parser,
            engine: TransformEngine::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load a file without transforming it.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        self.parser.parse_file(path)
    }

    /// Run every configured stage over an already loaded dataset.
    pub fn transform(&self, data: Dataset) -> Result<(Dataset, TransformResult)> {
        self.config.validate()?;
        self.engine.apply(&self.config.operations(), data)
    }

    /// Load and clean a file. Nothing is written.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<PipelineOutcome> {
        let (data, source) = self.load(path)?;
        info!(
            file = %source.file,
            rows = source.row_count,
            columns = source.column_count,
            "Loaded source"
        );

        let (dataset, result) = self.transform(data)?;
        Ok(PipelineOutcome {
            source,
            dataset,
            result,
        })
    }

    /// Write a cleaned dataset to the configured sinks.
    pub async fn write(&self, dataset: Arc<Dataset>) -> Result<OutputReport> {
        write_outputs(dataset, &self.config.output).await
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputConfig;
    use crate::dataset::Value;
    use crate::error::SifterError;
    use crate::transform::MissingColumnPolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn lenient() -> PipelineConfig {
        PipelineConfig {
            missing_column_policy: MissingColumnPolicy::Skip,
            output: OutputConfig {
                csv: None,
                database: None,
            },
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_run_small_file() {
        let file = create_test_file("RespondentID,Gender,Empty\n1,Male,\n2,,\n");
        let outcome = Pipeline::with_config(lenient()).run(file.path()).unwrap();

        assert_eq!(outcome.source.column_count, 3);
        assert_eq!(outcome.dataset.column_names(), vec!["respondentid", "gender"]);
        assert_eq!(outcome.dataset.get(1, "gender"), Some(&Value::text("N/A")));
        assert_eq!(outcome.result.operations_applied, 8);

        let summary = outcome.summary();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns_removed, 1);
    }

    #[test]
    fn test_default_policy_reports_missing_merge_columns() {
        let file = create_test_file("RespondentID,Gender\n1,Male\n");
        let err = Pipeline::new().run(file.path()).unwrap_err();
        match err {
            SifterError::MissingColumns { columns, .. } => {
                assert!(columns.contains(&"star_wars_films_seen".to_string()));
                assert!(columns.contains(&"c28".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = Pipeline::new().run("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, SifterError::Io { .. }));
    }
}
