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

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use deckstudio_core::Deck;
use deckstudio_core::Editor;
use deckstudio_core::ErrorKind;
use deckstudio_core::ErrorReport;
use deckstudio_core::Fallible;
use deckstudio_core::MergeMode;
use deckstudio_core::fail_with;

use crate::ollama::OllamaClient;
use crate::storage::load_deck;
use crate::storage::save_deck;
use crate::utils::count_noun;

pub struct GenerateConfig {
    /// File holding the source text.
    pub input: PathBuf,
    /// Empty means the default model.
    pub model: String,
    /// Deck file to write. `None` prints the deck instead.
    pub output: Option<PathBuf>,
    /// Add to the cards already in `output` rather than replacing them.
    pub append: bool,
}

/// Generate cards from a text file without the web UI. Returns what to print.
pub async fn generate_deck(client: &OllamaClient, config: GenerateConfig) -> Fallible<String> {
    let text = read_to_string(&config.input)
        .map_err(|e| ErrorReport::with_kind(ErrorKind::Load, format!("Failed to read: {e}")))?;
    log::info!("Generating flashcards from {}", config.input.display());
    let cards = client.generate_cards(&text, &config.model).await?;
    if cards.is_empty() {
        return fail_with(
            ErrorKind::Generation,
            "No flashcards were generated. Try different text or regenerate.",
        );
    }
    let generated = cards.len();
    let name = deck_name(&config.input);

    let Some(path) = config.output else {
        return Deck { name, cards }.to_json();
    };

    let mut editor = Editor::new();
    if path.exists() {
        editor.loaded(load_deck(&path)?, path.clone());
    } else {
        editor.rename_deck(name);
    }
    let mode = if config.append {
        MergeMode::Append
    } else {
        MergeMode::ReplaceAll
    };
    editor.merge_generated(cards, mode);
    save_deck(&path, editor.deck())?;
    log::info!("Saved deck to {}", path.display());
    Ok(format!(
        "Wrote {} to {} ({} total).",
        count_noun(generated, "card"),
        path.display(),
        count_noun(editor.len(), "card")
    ))
}

/// A new deck is named after the file its text came from.
fn deck_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| Deck::default().name)
}
