//! CLI command implementations.

pub mod check;
pub mod config;
pub mod run;

use std::path::Path;

use sifter::PipelineConfig;

/// Load a configuration file, or the default configuration when none is given.
pub(crate) fn load_config(path: Option<&Path>) -> sifter::Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path),
        None => Ok(PipelineConfig::default()),
    }
}
