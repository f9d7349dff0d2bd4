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
use std::process::exit;

use clap::Parser;
use deckstudio_core::Fallible;
use tokio::spawn;

use crate::cmd::check::check_deck;
use crate::cmd::generate::GenerateConfig;
use crate::cmd::generate::generate_deck;
use crate::cmd::models::list_models;
use crate::cmd::studio::server::ServerConfig;
use crate::cmd::studio::server::start_server;
use crate::ollama::OllamaClient;
use crate::settings::load_settings;
use crate::utils::wait_for_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Edit, generate, and study a deck through a web interface.
    Serve {
        /// Path to a deck file to open. By default, an empty deck is created.
        deck: Option<String>,
        /// The host address to bind to. Default is 127.0.0.1.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// The port to use for the web server. Default is 8000.
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Whether to open the browser automatically. Default is true.
        #[arg(long)]
        open_browser: Option<bool>,
        /// Base URL of the Ollama server. Overrides the settings file.
        #[arg(long)]
        ollama_url: Option<String>,
        /// Path to the settings file. By default, the user config directory is used.
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Generate flashcards from a text file.
    Generate {
        /// Path to the file holding the source text.
        #[arg(long)]
        input: PathBuf,
        /// Which model to use. By default, the last model chosen in the web interface.
        #[arg(long)]
        model: Option<String>,
        /// Deck file to write. By default, the deck is printed to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Add the new cards to the output deck instead of replacing its cards.
        #[arg(long)]
        append: bool,
        /// Base URL of the Ollama server. Overrides the settings file.
        #[arg(long)]
        ollama_url: Option<String>,
    },
    /// List the models installed in Ollama.
    Models {
        /// Base URL of the Ollama server. Overrides the settings file.
        #[arg(long)]
        ollama_url: Option<String>,
    },
    /// Check that a deck file is valid.
    Check {
        /// Path to the deck file.
        deck: PathBuf,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve {
            deck,
            host,
            port,
            open_browser,
            ollama_url,
            settings,
        } => {
            if open_browser.unwrap_or(true) {
                // Start a separate task to open the browser once the server is up.
                let browser_host = host.clone();
                spawn(async move {
                    match wait_for_server(&browser_host, port).await {
                        Ok(_) => {
                            let _ = open::that(format!("http://{browser_host}:{port}/"));
                        }
                        Err(e) => {
                            eprintln!("Failed to connect to server: {e}");
                            exit(-1)
                        }
                    }
                });
            }
            let config = ServerConfig {
                deck,
                host,
                port,
                ollama_url,
                settings_path: settings,
            };
            start_server(config).await
        }
        Command::Generate {
            input,
            model,
            output,
            append,
            ollama_url,
        } => {
            let (settings, _) = load_settings(None)?;
            let client = OllamaClient::new(&ollama_url.unwrap_or(settings.ollama_url));
            let config = GenerateConfig {
                input,
                model: model.or(settings.model).unwrap_or_default(),
                output,
                append,
            };
            println!("{}", generate_deck(&client, config).await?);
            Ok(())
        }
        Command::Models { ollama_url } => {
            let (settings, _) = load_settings(None)?;
            let client = OllamaClient::new(&ollama_url.unwrap_or(settings.ollama_url));
            println!("{}", list_models(&client).await?);
            Ok(())
        }
        Command::Check { deck } => {
            println!("{}", check_deck(&deck)?);
            Ok(())
        }
    }
}
