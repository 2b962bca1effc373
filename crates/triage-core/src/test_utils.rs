//! Test utilities for triage-core
//!
//! This module provides a mock Ollama server that answers every generate
//! request with a fixed reply (or a fixed non-success status) and records
//! what it received.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// A generate request as seen by the mock server
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub stream: bool,
}

#[derive(Clone)]
enum Reply {
    Text(String),
    /// Every endpoint answers with this status and an empty body
    Status(StatusCode),
}

#[derive(Clone)]
struct ServerState {
    reply: Reply,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start a server that answers every prompt with `reply`
    pub async fn with_response(reply: &str) -> Self {
        Self::start(Reply::Text(reply.to_string())).await
    }

    /// Start a server whose endpoints all return HTTP 500
    pub async fn failing() -> Self {
        Self::with_status(500).await
    }

    /// Start a server whose endpoints all return `status` with no body
    pub async fn with_status(status: u16) -> Self {
        let status = StatusCode::from_u16(status).unwrap();
        Self::start(Reply::Status(status)).await
    }

    async fn start(reply: Reply) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            reply,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Generate requests received so far, in arrival order
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags(State(state): State<ServerState>) -> Response {
    if let Reply::Status(status) = state.reply {
        return status.into_response();
    }
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "mistral:latest".to_string(),
            size: 4_000_000_000,
        }],
    })
    .into_response()
}

/// Ollama generate endpoint
async fn handle_generate(
    State(state): State<ServerState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let model = request.model.clone();
    state.requests.lock().unwrap().push(request);

    match state.reply {
        Reply::Text(response) => Json(GenerateResponse {
            model,
            response,
            done: true,
        })
        .into_response(),
        Reply::Status(status) => status.into_response(),
    }
}

#[derive(Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Serialize)]
struct ModelInfo {
    name: String,
    size: u64,
}

#[derive(Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}
