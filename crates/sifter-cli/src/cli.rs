//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sifter::config::DEFAULT_INPUT;

/// Sifter: cleaning pipeline for wide survey exports
#[derive(Parser)]
#[command(name = "sifter")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean a survey export and write it to CSV and a database table
    Run {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE", default_value = DEFAULT_INPUT)]
        file: PathBuf,

        /// Pipeline configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output path for the cleaned CSV [default: from config, else output.csv]
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        database: DatabaseArgs,

        /// Skip the database table
        #[arg(long)]
        no_db: bool,

        /// Number of rows to preview
        #[arg(long, default_value = "5")]
        preview: usize,
    },

    /// Clean a file and show the result without writing anything
    Check {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pipeline configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of rows to preview
        #[arg(long, default_value = "5")]
        preview: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print or save the default pipeline configuration
    Config {
        /// Write the configuration to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Overrides for the database sink.
#[derive(clap::Args, Debug, Default)]
pub struct DatabaseArgs {
    /// Connection URL (mysql://, postgres://, sqlite:, optionally jdbc:-prefixed)
    #[arg(long)]
    pub db_url: Option<String>,

    /// Table to overwrite
    #[arg(long)]
    pub table: Option<String>,

    /// Database user
    #[arg(long)]
    pub db_user: Option<String>,

    /// Database password
    #[arg(long, env = "SIFTER_DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Driver name; must match the URL's backend
    #[arg(long)]
    pub driver: Option<String>,
}
