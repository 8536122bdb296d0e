//! Check command - clean a file and report without writing.

use std::path::PathBuf;

use colored::Colorize;
use sifter::{Pipeline, PipelineOutcome};

use super::load_config;

pub fn run(
    file: PathBuf,
    config: Option<PathBuf>,
    preview: usize,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let mut config = load_config(config.as_deref())?;
    config.output.csv = None;
    config.output.database = None;

    let pipeline = Pipeline::with_config(config);
    let outcome = pipeline.run(&file)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&outcome.summary())?);
    } else {
        print_report(&outcome, preview, verbose);
    }

    Ok(())
}

/// Print the column list, row count, stage summary and a preview.
pub(crate) fn print_report(outcome: &PipelineOutcome, preview: usize, verbose: bool) {
    let data = &outcome.dataset;

    println!(
        "{} {} ({} rows, {} columns as loaded)",
        "Cleaned".cyan().bold(),
        outcome.source.file.white(),
        outcome.source.row_count,
        outcome.source.column_count
    );
    println!();

    println!("{}", "Stages:".yellow().bold());
    for change in &outcome.result.changes {
        let marker = if change.skipped {
            "-".dimmed()
        } else {
            "✓".green()
        };
        println!("  {} {:20} {}", marker, change.stage, change.description);
        if verbose && !change.columns.is_empty() {
            println!("      {}", change.columns.join(", ").dimmed());
        }
    }
    println!();

    println!("{}", "Columns:".yellow().bold());
    for column in data.columns() {
        println!("  {:40} {}", column.name, column.column_type());
    }
    println!();

    println!(
        "Rows: {}  (removed {}, {} values changed)",
        data.row_count().to_string().white().bold(),
        outcome.result.rows_removed,
        outcome.result.values_changed
    );

    if preview > 0 {
        println!();
        println!("{}", data.preview(preview));
    }
}
