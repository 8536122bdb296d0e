//! Config command - print or save the default configuration.

use std::path::PathBuf;

use colored::Colorize;
use sifter::PipelineConfig;

pub fn run(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = PipelineConfig::default();

    match output {
        Some(path) => {
            config.save(&path)?;
            println!(
                "{} {}",
                "Saved to".green().bold(),
                path.display().to_string().white()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }

    Ok(())
}
