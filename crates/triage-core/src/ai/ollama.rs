//! Ollama backend implementation
//!
//! HTTP client for the Ollama generate API. Every call is a single awaited
//! round-trip: no retries, no timeout, no caching. Failures never reach the
//! caller; they are logged and turned into an empty summary or the fallback
//! classification.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};

use super::types::Classification;
use super::TextGenerator;

/// Confidence reported for any label the model returns verbatim
pub const MODEL_LABEL_CONFIDENCE: f64 = 0.85;

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create from the run configuration (`LLM_HOST`, `LLM_MODEL`)
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.host, &config.model)
    }

    /// Send a prompt and return the trimmed response text
    async fn generate(&self, prompt: String) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        // error_for_status only rejects 4xx/5xx; an unfollowed 3xx is still Ok
        let response = response.error_for_status()?;
        if !response.status().is_success() {
            return Err(Error::InvalidData(format!(
                "unexpected Ollama status {}",
                response.status()
            )));
        }

        let body = response.bytes().await?;
        let ollama_response: OllamaResponse = serde_json::from_slice(&body)?;
        debug!("Ollama response: {}", ollama_response.response);

        Ok(ollama_response.response.trim().to_string())
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

/// Prompt asking for a short Portuguese summary of a ticket
pub fn summarize_prompt(text: &str) -> String {
    format!(
        "Resuma o seguinte chamado em até 3 frases (ou menos) relatando o que o cliente enviou, \
         em português claro:\n\n{}\n\nResumo:",
        text
    )
}

/// Prompt asking for exactly one category name out of `categories`
pub fn classify_prompt(text: &str, categories: &[String]) -> String {
    // First entry carries no dash
    let options = categories.join("\n - ");

    format!(
        "Classifique o chamado abaixo em somente **UMA** das categorias a seguir:\n\
         {}\n\n\
         Chamado: {}\n\n\
         Responda apenas com o nome exato da categoria: ",
        options, text
    )
}

/// Accept the model output only if it names a category exactly
fn parse_label(label: &str, categories: &[String]) -> Classification {
    let label = label.trim();
    if categories.iter().any(|c| c == label) {
        Classification::new(label, MODEL_LABEL_CONFIDENCE)
    } else {
        debug!("Model label '{}' is not a known category, using fallback", label);
        Classification::fallback(categories)
    }
}

#[async_trait]
impl TextGenerator for OllamaBackend {
    async fn summarize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        match self.generate(summarize_prompt(text)).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Error communicating with LLM API during summarize: {}", e);
                String::new()
            }
        }
    }

    async fn classify(&self, text: &str, categories: &[String]) -> Classification {
        let label = match self.generate(classify_prompt(text, categories)).await {
            Ok(label) => label,
            Err(e) => {
                warn!("Error communicating with LLM API during classify: {}", e);
                String::new()
            }
        };

        parse_label(&label, categories)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::{default_categories, FALLBACK_CONFIDENCE};
    use crate::test_utils::MockOllamaServer;

    #[test]
    fn test_new_trims_trailing_slash() {
        let backend = OllamaBackend::new("http://localhost:11434/", "mistral");
        assert_eq!(backend.host(), "http://localhost:11434");
        assert_eq!(backend.model(), "mistral");
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            model: "qwen2.5".to_string(),
            host: "http://gpu-box:11434".to_string(),
            ..Config::default()
        };
        let backend = OllamaBackend::from_config(&config);
        assert_eq!(backend.model(), "qwen2.5");
        assert_eq!(backend.host(), "http://gpu-box:11434");
    }

    #[test]
    fn test_classify_prompt_lists_categories() {
        let prompt = classify_prompt("Minha fatura veio errada", &default_categories());
        assert!(prompt.contains("a seguir:\nReclamação\n - Suporte técnico\n"));
        assert!(prompt.contains("Chamado: Minha fatura veio errada"));
        assert!(prompt.ends_with("nome exato da categoria: "));
    }

    #[test]
    fn test_parse_label() {
        let categories = default_categories();
        assert_eq!(
            parse_label(" Feedback \n", &categories),
            Classification::new("Feedback", 0.85)
        );
        // Case must match exactly
        assert_eq!(parse_label("feedback", &categories).category, "Dúvida");
        assert_eq!(parse_label("", &categories).confidence, FALLBACK_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_summarize_via_server() {
        let mut server = MockOllamaServer::with_response("  O cliente relata erro no login.  ").await;
        let backend = OllamaBackend::new(&server.url(), "test-model");

        let summary = backend.summarize("Erro no login desde ontem").await;
        assert_eq!(summary, "O cliente relata erro no login.");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "test-model");
        assert!(!requests[0].stream);
        assert!(requests[0].prompt.starts_with("Resuma o seguinte chamado"));
        assert!(requests[0].prompt.contains("Erro no login desde ontem"));

        server.stop();
    }

    #[tokio::test]
    async fn test_summarize_empty_text_skips_request() {
        let mut server = MockOllamaServer::with_response("nunca usado").await;
        let backend = OllamaBackend::new(&server.url(), "test-model");

        assert_eq!(backend.summarize("   ").await, "");
        assert!(server.requests().is_empty());

        server.stop();
    }

    #[tokio::test]
    async fn test_classify_known_label() {
        let mut server = MockOllamaServer::with_response("Suporte técnico\n").await;
        let backend = OllamaBackend::new(&server.url(), "test-model");

        let result = backend
            .classify("Erro no login", &default_categories())
            .await;
        assert_eq!(result, Classification::new("Suporte técnico", 0.85));

        server.stop();
    }

    #[tokio::test]
    async fn test_classify_unknown_label_falls_back() {
        let mut server = MockOllamaServer::with_response("Categoria: Suporte").await;
        let backend = OllamaBackend::new(&server.url(), "test-model");

        let result = backend
            .classify("Erro no login", &default_categories())
            .await;
        assert_eq!(result.category, "Dúvida");
        assert_eq!(result.confidence, 0.35);

        server.stop();
    }

    #[tokio::test]
    async fn test_server_error_is_recovered() {
        let mut server = MockOllamaServer::failing().await;
        let backend = OllamaBackend::new(&server.url(), "test-model");

        assert_eq!(backend.summarize("Erro no login").await, "");
        let result = backend
            .classify("Erro no login", &default_categories())
            .await;
        assert_eq!(result, Classification::fallback(&default_categories()));
        assert!(!backend.health_check().await);

        server.stop();
    }

    #[tokio::test]
    async fn test_redirect_status_is_recovered() {
        for status in [300, 304, 305] {
            let mut server = MockOllamaServer::with_status(status).await;
            let backend = OllamaBackend::new(&server.url(), "test-model");

            assert_eq!(backend.summarize("Erro no login").await, "");
            let result = backend
                .classify("Erro no login", &default_categories())
                .await;
            assert_eq!(result, Classification::fallback(&default_categories()));
            assert_eq!(server.requests().len(), 2);

            server.stop();
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_recovered() {
        let mut server = MockOllamaServer::with_status(200).await;
        let backend = OllamaBackend::new(&server.url(), "test-model");

        // 200 with an empty body is not a generate response
        assert!(matches!(
            backend.generate("Oi".to_string()).await,
            Err(Error::Json(_))
        ));
        assert_eq!(backend.summarize("Erro no login").await, "");

        server.stop();
    }

    #[tokio::test]
    async fn test_unreachable_host_is_recovered() {
        // Nothing listens on port 9 (discard) on a test machine
        let backend = OllamaBackend::new("http://127.0.0.1:9", "test-model");

        assert_eq!(backend.summarize("Erro no login").await, "");
        assert_eq!(
            backend
                .classify("Erro no login", &default_categories())
                .await
                .category,
            "Dúvida"
        );
        assert!(!backend.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check() {
        let mut server = MockOllamaServer::with_response("ok").await;
        let backend = OllamaBackend::new(&server.url(), "test-model");
        assert!(backend.health_check().await);
        server.stop();
    }
}
