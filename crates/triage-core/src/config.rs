//! Run configuration
//!
//! A `Config` is resolved once at startup and passed by reference to the
//! components that need it (backend selection, file paths). Values come from
//! environment variables with defaults:
//!
//! - `DATA_DIR`: directory for default input/output files (default: `data`)
//! - `INPUT_CSV`: ticket table to enrich (default: `{DATA_DIR}/tickets_atendimento_sinteticos.csv`)
//! - `OUTPUT_CSV`: enriched table destination (default: `{DATA_DIR}/tickets_enriched.csv`)
//! - `LLM_PROVIDER`: `mock` or `ollama` (default: `mock`)
//! - `LLM_MODEL`: model name for the ollama provider (default: `mistral`)
//! - `LLM_HOST`: Ollama server URL (default: `http://localhost:11434`)

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_INPUT_FILE: &str = "tickets_atendimento_sinteticos.csv";
pub const DEFAULT_OUTPUT_FILE: &str = "tickets_enriched.csv";
pub const DEFAULT_PROVIDER: &str = "mock";
pub const DEFAULT_MODEL: &str = "mistral";
pub const DEFAULT_HOST: &str = "http://localhost:11434";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub input_csv: PathBuf,
    pub output_csv: PathBuf,
    /// Provider identifier, lower-cased. Parsed into a `Provider` at backend selection.
    pub provider: String,
    pub model: String,
    pub host: String,
}

/// Per-field overrides, typically from CLI flags
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_csv: Option<PathBuf>,
    pub output_csv: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub host: Option<String>,
}

impl Config {
    /// Resolve configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = get("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let input_csv = get("INPUT_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DEFAULT_INPUT_FILE));
        let output_csv = get("OUTPUT_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DEFAULT_OUTPUT_FILE));
        let provider = get("LLM_PROVIDER").unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
        let model = get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let host = get("LLM_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        Ok(Self {
            data_dir,
            input_csv,
            output_csv,
            provider: normalize_provider(&provider),
            model: model.trim().to_string(),
            host: normalize_host(&host)?,
        })
    }

    /// Apply overrides on top of the resolved values
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(input) = overrides.input_csv {
            self.input_csv = input;
        }
        if let Some(output) = overrides.output_csv {
            self.output_csv = output;
        }
        if let Some(provider) = overrides.provider {
            self.provider = normalize_provider(&provider);
        }
        if let Some(model) = overrides.model {
            self.model = model.trim().to_string();
        }
        if let Some(host) = overrides.host {
            self.host = normalize_host(&host)?;
        }
        Ok(self)
    }

    pub fn input_path(&self) -> &Path {
        &self.input_csv
    }

    pub fn output_path(&self) -> &Path {
        &self.output_csv
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = PathBuf::from(DEFAULT_DATA_DIR);
        Self {
            input_csv: data_dir.join(DEFAULT_INPUT_FILE),
            output_csv: data_dir.join(DEFAULT_OUTPUT_FILE),
            data_dir,
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            host: DEFAULT_HOST.to_string(),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Data dir:   {}", self.data_dir.display())?;
        writeln!(f, "  Input CSV:  {}", self.input_csv.display())?;
        writeln!(f, "  Output CSV: {}", self.output_csv.display())?;
        writeln!(f, "  Provider:   {}", self.provider)?;
        writeln!(f, "  Model:      {}", self.model)?;
        write!(f, "  Host:       {}", self.host)
    }
}

fn normalize_provider(provider: &str) -> String {
    provider.trim().to_lowercase()
}

fn normalize_host(host: &str) -> Result<String> {
    let host = host.trim().trim_end_matches('/');
    if !(host.starts_with("http://") || host.starts_with("https://")) {
        return Err(Error::Config(format!(
            "LLM host must be an http(s) URL, got '{}'",
            host
        )));
    }
    Ok(host.to_string())
}
