//! Run command - clean a survey export and write it out.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use sifter::{Pipeline, SinkConfig};

use super::check::print_report;
use super::load_config;
use crate::cli::DatabaseArgs;

pub fn run(
    file: PathBuf,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    database: DatabaseArgs,
    no_db: bool,
    preview: usize,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let mut config = load_config(config.as_deref())?;
    if let Some(path) = output {
        config.output.csv = Some(path);
    }
    if no_db {
        config.output.database = None;
    } else {
        let sink = config
            .output
            .database
            .get_or_insert_with(SinkConfig::default);
        apply_database_args(sink, database);
    }
    config.validate()?;

    println!(
        "{} {}",
        "Cleaning".cyan().bold(),
        file.display().to_string().white()
    );

    let pipeline = Pipeline::with_config(config);
    let outcome = pipeline.run(&file)?;
    print_report(&outcome, preview, verbose);

    let dataset = Arc::new(outcome.dataset);
    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(pipeline.write(dataset))?;

    println!();
    if let (Some(rows), Some(path)) = (report.csv_rows, &pipeline.config().output.csv) {
        println!(
            "{} {} rows to {}",
            "Wrote".green().bold(),
            rows,
            path.display().to_string().white()
        );
    }
    if let (Some(rows), Some(sink)) = (report.database_rows, &pipeline.config().output.database) {
        println!(
            "{} {} rows to table {}",
            "Wrote".green().bold(),
            rows,
            sink.table.white()
        );
    }

    Ok(())
}

fn apply_database_args(sink: &mut SinkConfig, args: DatabaseArgs) {
    if let Some(url) = args.db_url {
        sink.url = url;
        // A driver from the config may not fit the new URL.
        if args.driver.is_none() {
            sink.driver = None;
        }
    }
    if let Some(table) = args.table {
        sink.table = table;
    }
    if let Some(user) = args.db_user {
        sink.user = Some(user);
    }
    if let Some(password) = args.db_password {
        sink.password = Some(password);
    }
    if let Some(driver) = args.driver {
        sink.driver = Some(driver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_override_clears_stale_driver() {
        let mut sink = SinkConfig::default();
        apply_database_args(
            &mut sink,
            DatabaseArgs {
                db_url: Some("sqlite://out.db?mode=rwc".to_string()),
                ..DatabaseArgs::default()
            },
        );
        assert_eq!(sink.driver, None);
        assert_eq!(sink.table, "starwars_cleaned");
        assert!(sink.validate().is_ok());
    }

    #[test]
    fn test_config_output_kept_without_flag() {
        let dir = tempfile::TempDir::new().unwrap();
        let data = dir.path().join("data.csv");
        std::fs::write(&data, "Gender\nMale\n").unwrap();
        let out = dir.path().join("out").join("clean.csv");

        let mut config = sifter::PipelineConfig::default();
        config.output.csv = Some(out.clone());
        config.missing_column_policy = sifter::MissingColumnPolicy::Skip;
        let config_path = dir.path().join("config.json");
        config.save(&config_path).unwrap();

        run(
            data,
            Some(config_path),
            None,
            DatabaseArgs::default(),
            true,
            0,
            false,
        )
        .unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "gender\nMale\n");
        assert!(!dir.path().join("output.csv").exists());
    }

    #[test]
    fn test_overrides_applied() {
        let mut sink = SinkConfig::default();
        apply_database_args(
            &mut sink,
            DatabaseArgs {
                table: Some("survey".to_string()),
                db_user: Some("alice".to_string()),
                db_password: Some("pw".to_string()),
                ..DatabaseArgs::default()
            },
        );
        assert_eq!(sink.table, "survey");
        assert_eq!(sink.user.as_deref(), Some("alice"));
        assert_eq!(sink.password.as_deref(), Some("pw"));
        assert!(sink.driver.is_some());
    }
}
