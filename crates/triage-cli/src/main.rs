//! Triage CLI - Support-ticket enrichment
//!
//! Usage:
//!   triage run                       Enrich INPUT_CSV into OUTPUT_CSV
//!   triage run --provider ollama     Use an Ollama model instead of heuristics
//!   triage config                    Show the resolved configuration
//!   triage check                     Check the Ollama server
//!   triage classify "texto"          Try one ticket text

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Before logging setup so RUST_LOG can come from the file
    let env_file = commands::load_env_file(cli.env_file.as_deref())?;

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    if let Some(path) = env_file {
        debug!("Loaded environment from {}", path.display());
    }

    match cli.command {
        Commands::Run {
            input,
            output,
            backend,
            dry_run,
        } => {
            let overrides = triage_core::ConfigOverrides {
                input_csv: input,
                output_csv: output,
                ..backend.overrides()
            };
            let config = commands::load_config(overrides)?;
            commands::cmd_run(&config, dry_run).await.map(|_| ())
        }
        Commands::Config => {
            let config = commands::load_config(Default::default())?;
            commands::cmd_config(&config)
        }
        Commands::Check { backend } => {
            let config = commands::load_config(backend.overrides())?;
            commands::cmd_check(&config).await
        }
        Commands::Classify {
            text,
            backend,
            json,
        } => {
            let config = commands::load_config(backend.overrides())?;
            commands::cmd_classify(&config, &text, json).await
        }
    }
}
