//! Pluggable text generation backends
//!
//! This module provides a backend-agnostic interface for summarizing and
//! classifying support tickets.
//!
//! # Architecture
//!
//! - `TextGenerator` trait: defines the interface for all backends
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `MockBackend` (offline heuristics), `OllamaBackend`
//! - `Provider`: closed set of backend identifiers, parsed from configuration
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = Config::from_env()?;
//! let client = AIClient::from_config(&config)?;
//!
//! let summary = client.summarize("Erro no login. Não consigo acessar.").await;
//! let result = client.classify("Erro no login", &default_categories()).await;
//! println!("{} ({:.2})", result.category, result.confidence);
//! ```

mod mock;
mod ollama;
pub mod types;

pub use mock::{heuristic_classification, heuristic_summary, MockBackend};
pub use ollama::{classify_prompt, summarize_prompt, OllamaBackend, MODEL_LABEL_CONFIDENCE};
pub use types::*;

use async_trait::async_trait;
use tracing::info;

use crate::config::Config;
use crate::error::Result;

/// Trait defining the interface for all text generation backends
///
/// Implementations must accept any text, including empty or malformed input,
/// without failing. Recoverable problems are logged and mapped to an empty
/// summary or the fallback classification.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Summarize a ticket description; `""` for empty or whitespace-only text
    async fn summarize(&self, text: &str) -> String;

    /// Classify a ticket into one of `categories`
    ///
    /// The returned category is always a member of `categories` (or the
    /// fallback category when the set is empty) and the confidence lies in
    /// [`FALLBACK_CONFIDENCE`, `MAX_CONFIDENCE`].
    async fn classify(&self, text: &str, categories: &[String]) -> Classification;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Offline heuristic backend
    Mock(MockBackend),
}

impl AIClient {
    /// Construct the backend for `provider`
    ///
    /// The Ollama backend takes its model and host from `config`.
    pub fn for_provider(provider: Provider, config: &Config) -> Self {
        info!("Using LLM provider: {}", provider);
        match provider {
            Provider::Mock => AIClient::Mock(MockBackend::new()),
            Provider::Ollama => AIClient::Ollama(OllamaBackend::from_config(config)),
        }
    }

    /// Parse the configured provider identifier and construct its backend
    ///
    /// Fails with `Error::UnknownProvider` for identifiers outside the known set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider: Provider = config.provider.parse()?;
        Ok(Self::for_provider(provider, config))
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Which provider this client was built for
    pub fn provider(&self) -> Provider {
        match self {
            AIClient::Ollama(_) => Provider::Ollama,
            AIClient::Mock(_) => Provider::Mock,
        }
    }
}

// Implement TextGenerator for AIClient by delegating to the inner backend
#[async_trait]
impl TextGenerator for AIClient {
    async fn summarize(&self, text: &str) -> String {
        match self {
            AIClient::Ollama(b) => b.summarize(text).await,
            AIClient::Mock(b) => b.summarize(text).await,
        }
    }

    async fn classify(&self, text: &str, categories: &[String]) -> Classification {
        match self {
            AIClient::Ollama(b) => b.classify(text, categories).await,
            AIClient::Mock(b) => b.classify(text, categories).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
