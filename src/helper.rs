// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Test helpers.

use std::path::PathBuf;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::routing::post;
use deckstudio_core::ErrorReport;
use deckstudio_core::Fallible;
use serde_json::Value;
use serde_json::json;
use tempfile::tempdir;
use tokio::net::TcpListener;
use tokio::spawn;
use tokio::time::sleep;

/// Create a scratch directory that outlives the `TempDir` guard.
pub fn create_tmp_directory() -> Fallible<PathBuf> {
    let dir = tempdir()?.keep();
    Ok(dir.canonicalize()?)
}

/// What the fake Ollama server answers with.
#[derive(Clone)]
pub struct MockOllama {
    pub models: Vec<String>,
    /// The `response` field of `/api/generate`: the model's own text.
    pub reply: String,
    pub status: StatusCode,
    /// How long `/api/generate` takes to answer.
    pub delay: Duration,
}

impl MockOllama {
    pub fn replying(reply: &str) -> Self {
        Self {
            models: vec!["mistral:latest".to_string()],
            reply: reply.to_string(),
            status: StatusCode::OK,
            delay: Duration::ZERO,
        }
    }
}

/// Start a fake Ollama server on a free port and return its base URL.
pub async fn spawn_mock_ollama(mock: MockOllama) -> Fallible<String> {
    let app = Router::new()
        .route("/api/tags", get(tags_handler))
        .route("/api/generate", post(generate_handler))
        .with_state(mock);
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    spawn(async move { axum::serve(listener, app).await });
    Ok(format!("http://{addr}"))
}

async fn tags_handler(State(mock): State<MockOllama>) -> Json<Value> {
    let models: Vec<Value> = mock.models.iter().map(|m| json!({ "name": m })).collect();
    Json(json!({ "models": models }))
}

async fn generate_handler(
    State(mock): State<MockOllama>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    // Reject requests that don't look like what Ollama expects.
    let well_formed = body["model"].is_string()
        && body["prompt"].is_string()
        && body["stream"] == json!(false)
        && body["format"] == json!("json");
    if !well_formed {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "bad request" })));
    }
    sleep(mock.delay).await;
    (mock.status, Json(json!({ "response": mock.reply })))
}

/// A base URL nothing is listening on.
pub fn dead_ollama_url() -> String {
    let port = portpicker::pick_unused_port().unwrap_or(1);
    format!("http://127.0.0.1:{port}")
}

/// Lets tests use `?` on HTTP client errors.
pub fn http_error(e: reqwest::Error) -> ErrorReport {
    ErrorReport::new(format!("HTTP error: {e}"))
}
