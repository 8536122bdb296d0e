//! Fuzz target for the loader and the cleaning stages.
//!
//! Loading arbitrary bytes must either fail with an error or produce a
//! dataset the default stages can run over without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sifter::{MissingColumnPolicy, Parser, Pipeline, PipelineConfig};

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let parser = Parser::new();
    for delimiter in [b',', b'\t'] {
        let Ok(dataset) = parser.parse_bytes(data, delimiter) else {
            continue;
        };

        let pipeline = Pipeline::with_config(PipelineConfig {
            missing_column_policy: MissingColumnPolicy::Skip,
            ..PipelineConfig::default()
        });
        if let Ok((cleaned, _)) = pipeline.transform(dataset) {
            assert!(cleaned.columns().iter().all(|c| c.len() == cleaned.row_count()));
        }
    }
});
