//! Sifter CLI - survey-export cleaning pipeline.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            file,
            config,
            output,
            database,
            no_db,
            preview,
        } => commands::run::run(file, config, output, database, no_db, preview, cli.verbose),

        Commands::Check {
            file,
            config,
            preview,
            json,
        } => commands::check::run(file, config, preview, json, cli.verbose),

        Commands::Config { output } => commands::config::run(output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
