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

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use deckstudio_core::Editor;
use deckstudio_core::Fallible;
use deckstudio_core::rng::TinyRng;
use tokio::net::TcpListener;
use tokio::select;
use tokio::signal;
use tokio::sync::oneshot::Receiver;
use tokio::sync::oneshot::channel;

use crate::cmd::studio::get::get_handler;
use crate::cmd::studio::post::post_handler;
use crate::cmd::studio::post::refresh_models;
use crate::cmd::studio::state::MutableState;
use crate::cmd::studio::state::ServerState;
use crate::cmd::studio::state::View;
use crate::ollama::OllamaClient;
use crate::settings::load_settings;
use crate::storage::load_deck;
use crate::utils::CACHE_CONTROL_IMMUTABLE;

pub struct ServerConfig {
    /// A deck file to open at startup.
    pub deck: Option<String>,
    pub host: String,
    pub port: u16,
    /// Overrides the Ollama URL from the settings file.
    pub ollama_url: Option<String>,
    /// Overrides the settings file location.
    pub settings_path: Option<PathBuf>,
}

pub async fn start_server(config: ServerConfig) -> Fallible<()> {
    let (settings, settings_path) = load_settings(config.settings_path.as_deref())?;

    let mut editor = Editor::new();
    let mut view = View::Generate;
    if let Some(deck) = config.deck {
        let path = PathBuf::from(deck);
        let deck = load_deck(&path)?;
        log::info!("Loaded {} ({} cards)", path.display(), deck.cards.len());
        editor.loaded(deck, path);
        view = View::Edit;
    }

    let ollama_url = config
        .ollama_url
        .unwrap_or_else(|| settings.ollama_url.clone());
    let ollama = OllamaClient::new(&ollama_url);
    log::debug!("Using Ollama at {}", ollama.base_url());

    let mut mutable = MutableState::new(editor, settings, TinyRng::from_clock());
    mutable.switch_view(view);

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = channel();

    let state = ServerState {
        ollama,
        settings_path,
        mutable: Arc::new(Mutex::new(mutable)),
        shutdown_tx: Arc::new(Mutex::new(Some(shutdown_tx))),
    };

    // Probe the model server before the first page is served.
    refresh_models(&state).await;

    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/", post(post_handler));
    let app = app.route("/script.js", get(script_handler));
    let app = app.route("/style.css", get(style_handler));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state.clone());
    let bind = format!("{}:{}", config.host, config.port);

    // Start the server with graceful shutdown on Ctrl+C or shutdown button.
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await?;

    let mutable = state.mutable.lock().unwrap();
    if mutable.editor.is_dirty() {
        log::warn!("Exited with unsaved changes to {}", mutable.editor.deck().name);
    }
    Ok(())
}

async fn script_handler() -> (StatusCode, [(HeaderName, &'static str); 1], &'static str) {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/javascript")],
        include_str!("script.js"),
    )
}

async fn style_handler() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}

async fn shutdown_signal(shutdown_rx: Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    let shutdown = async {
        shutdown_rx.await.ok();
    };

    select! {
        _ = ctrl_c => {
            log::debug!("Received Ctrl+C, shutting down gracefully");
        },
        _ = shutdown => {
            log::debug!("Received shutdown signal, shutting down gracefully");
        },
    }
}
