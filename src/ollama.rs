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

//! Client for a local Ollama server: card generation and the model list.

use std::time::Duration;

use deckstudio_core::Card;
use deckstudio_core::ErrorKind;
use deckstudio_core::ErrorReport;
use deckstudio_core::Fallible;
use deckstudio_core::fail_with;
use deckstudio_core::generation::build_prompt;
use deckstudio_core::generation::parse_generated;
use deckstudio_core::generation::resolve_model;
use deckstudio_core::generation::source_text;
use serde::Deserialize;
use serde::Serialize;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// How long the model list may take before Ollama counts as unreachable.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    format: &'a str,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: i32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: Option<String>,
}

#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the model for flashcards about `text`.
    ///
    /// Blank text is rejected before any request is made. An empty `model`
    /// means the default model.
    pub async fn generate_cards(&self, text: &str, model: &str) -> Fallible<Vec<Card>> {
        let text = source_text(text)?;
        let request = GenerateRequest {
            model: resolve_model(model),
            prompt: build_prompt(text),
            stream: false,
            format: "json",
            options: GenerateOptions {
                temperature: 0.3,
                num_predict: 4096,
            },
        };
        log::debug!("Generating cards with model {}", request.model);
        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ErrorReport::with_kind(
                    ErrorKind::Generation,
                    format!("Failed to connect to Ollama. Is it running?\n{e}"),
                )
            })?;
        if !response.status().is_success() {
            return fail_with(
                ErrorKind::Generation,
                format!("Ollama returned status: {}", response.status()),
            );
        }
        let body: GenerateResponse = response.json().await.map_err(|e| {
            ErrorReport::with_kind(
                ErrorKind::Generation,
                format!("Failed to parse Ollama response: {e}"),
            )
        })?;
        parse_generated(&body.response)
    }

    /// The names of the installed models. Doubles as the connectivity probe.
    pub async fn list_models(&self) -> Fallible<Vec<String>> {
        let response = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|_| ErrorReport::with_kind(ErrorKind::Connectivity, "Cannot connect to Ollama"))?;
        let tags: TagsResponse = response.json().await.map_err(|_| {
            ErrorReport::with_kind(ErrorKind::Connectivity, "Invalid response from Ollama")
        })?;
        Ok(tags.models.into_iter().filter_map(|m| m.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::helper::MockOllama;
    use crate::helper::dead_ollama_url;
    use crate::helper::spawn_mock_ollama;

    const REPLY: &str = r#"{"cards": [
        {"question": "What do plants make in photosynthesis?", "answer": "Glucose and oxygen"},
        {"question": "Where does it happen?", "answer": "Chloroplasts"}
    ]}"#;

    #[tokio::test]
    async fn test_list_models() -> Fallible<()> {
        let mut mock = MockOllama::replying(REPLY);
        mock.models = vec!["mistral:latest".to_string(), "llama3:8b".to_string()];
        let url = spawn_mock_ollama(mock).await?;
        let client = OllamaClient::new(&url);
        assert_eq!(client.list_models().await?, vec!["mistral:latest", "llama3:8b"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_models_empty() -> Fallible<()> {
        let mut mock = MockOllama::replying(REPLY);
        mock.models = vec![];
        let url = spawn_mock_ollama(mock).await?;
        assert!(OllamaClient::new(&url).list_models().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_models_unreachable() {
        let client = OllamaClient::new(&dead_ollama_url());
        let err = client.list_models().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connectivity);
        assert_eq!(err.message(), "Cannot connect to Ollama");
    }

    #[tokio::test]
    async fn test_generate_cards() -> Fallible<()> {
        let url = spawn_mock_ollama(MockOllama::replying(REPLY)).await?;
        let client = OllamaClient::new(&format!("{url}/"));
        let cards = client.generate_cards("  Photosynthesis...  ", "").await?;
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].answer, "Chloroplasts");
        assert_ne!(cards[0].id, cards[1].id);
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_text() {
        // Nothing listens here; blank text must fail before connecting.
        let client = OllamaClient::new(&dead_ollama_url());
        let err = client.generate_cards(" \n ", "mistral").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
    }

    #[tokio::test]
    async fn test_generate_bad_status() -> Fallible<()> {
        let mut mock = MockOllama::replying(REPLY);
        mock.status = StatusCode::INTERNAL_SERVER_ERROR;
        let url = spawn_mock_ollama(mock).await?;
        let err = OllamaClient::new(&url)
            .generate_cards("text", "mistral")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generation);
        assert!(err.message().starts_with("Ollama returned status: 500"));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_invalid_json() -> Fallible<()> {
        let url = spawn_mock_ollama(MockOllama::replying("I cannot do that.")).await?;
        let err = OllamaClient::new(&url)
            .generate_cards("text", "mistral")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generation);
        assert!(err.message().starts_with("LLM returned invalid JSON."));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_unreachable() {
        let client = OllamaClient::new(&dead_ollama_url());
        let err = client.generate_cards("text", "mistral").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generation);
        assert!(err.message().starts_with("Failed to connect to Ollama."));
    }
}
