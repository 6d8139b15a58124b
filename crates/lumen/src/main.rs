//! Lumen CLI - ranked image labels from a pretrained classifier.
//!
//! Lumen takes images as input and outputs structured label data: for each
//! image, a ranked list of names with uncertainty scores and categories.
//! It is a thin command-line consumer of the `lumen-core` library.
//!
//! # Usage
//!
//! ```bash
//! # Classify a single image
//! lumen classify photo.jpg
//!
//! # Classify several, one JSON record per line
//! lumen classify a.jpg b.jpg --format jsonl --output results.jsonl
//!
//! # Inspect the label table of the configured model
//! lumen labels
//!
//! # View configuration
//! lumen config show
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod cli;
mod logging;

/// Lumen - ranked image labels from a pretrained classifier.
#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify images and print ranked labels
    Classify(cli::classify::ClassifyArgs),

    /// List the configured model's label table
    Labels,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI overrides.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `lumen config path`."
            );
            lumen_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.quiet, cli.json_logs);

    tracing::debug!("Lumen v{}", lumen_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Classify(args) => cli::classify::execute(args, &config).await,
        Commands::Labels => cli::labels::execute(&config).await,
        Commands::Config(args) => {
            cli::config::execute(args, &config, cli.config.as_deref()).await
        }
    }
}

/// Load configuration, honoring the global `--config` override.
fn load_config(
    override_path: Option<&Path>,
) -> Result<lumen_core::Config, lumen_core::ConfigError> {
    match override_path {
        Some(path) => lumen_core::Config::load_from(path),
        None => lumen_core::Config::load(),
    }
}
