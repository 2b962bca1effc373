//! Triage Core Library
//!
//! Shared functionality for the Triage support-ticket enrichment tool:
//! - Run configuration resolved from the environment
//! - Semicolon-delimited ticket tables (CSV read/write)
//! - Description preprocessing
//! - Pluggable text generation backends (offline heuristics, Ollama)
//! - The row processing pipeline that adds summary, category and confidence

pub mod ai;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod preprocess;
pub mod table;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIClient, Classification, MockBackend, OllamaBackend, Provider, TextGenerator, CATEGORIES,
};
pub use config::{Config, ConfigOverrides};
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use table::TicketTable;
