//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use triage_core::ConfigOverrides;

/// Triage - Summarize and categorize support tickets
#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Support-ticket enrichment pipeline (summary, category, confidence)", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Env file to load instead of searching for `.env`
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Backend selection flags shared by commands that talk to a provider
///
/// Each flag overrides the matching environment variable.
#[derive(Args, Debug, Clone, Default)]
pub struct BackendArgs {
    /// LLM provider: mock or ollama (env: LLM_PROVIDER)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model name for the ollama provider (env: LLM_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama server URL (env: LLM_HOST)
    #[arg(long)]
    pub host: Option<String>,
}

impl BackendArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            provider: self.provider.clone(),
            model: self.model.clone(),
            host: self.host.clone(),
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enrich the ticket table and write the result
    Run {
        /// Input CSV (env: INPUT_CSV)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output CSV (env: OUTPUT_CSV)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        backend: BackendArgs,

        /// Process tickets but do not write the output file
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the resolved configuration
    Config,

    /// Check that the configured Ollama server is reachable
    Check {
        #[command(flatten)]
        backend: BackendArgs,
    },

    /// Summarize and classify a single ticket text
    Classify {
        /// Ticket text
        text: String,

        #[command(flatten)]
        backend: BackendArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}
