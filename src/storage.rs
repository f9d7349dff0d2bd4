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

//! Reading and writing deck files.

use std::fs::create_dir_all;
use std::fs::read_to_string;
use std::fs::write;
use std::path::Path;
use std::path::PathBuf;

use deckstudio_core::Deck;
use deckstudio_core::ErrorKind;
use deckstudio_core::ErrorReport;
use deckstudio_core::Fallible;
use deckstudio_core::fail_with;

/// Name of the directory under the home directory where decks are saved by
/// default.
const DECK_DIRECTORY: &str = "FlashcardDecks";

pub fn load_deck(path: &Path) -> Fallible<Deck> {
    let text = read_to_string(path)
        .map_err(|e| ErrorReport::with_kind(ErrorKind::Load, format!("Failed to read: {e}")))?;
    Deck::from_json(&text)
}

pub fn save_deck(path: &Path, deck: &Deck) -> Fallible<()> {
    let json = deck.to_json()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent).map_err(|e| {
                ErrorReport::with_kind(ErrorKind::Save, format!("Failed to save: {e}"))
            })?;
        }
    }
    write(path, json)
        .map_err(|e| ErrorReport::with_kind(ErrorKind::Save, format!("Failed to save: {e}")))?;
    Ok(())
}

/// The directory suggested for new decks, without touching the filesystem.
pub fn deck_directory() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DECK_DIRECTORY))
}

/// The directory suggested for new decks. Created if missing.
pub fn default_save_directory() -> Fallible<PathBuf> {
    let Some(dir) = deck_directory() else {
        return fail_with(ErrorKind::Save, "Cannot determine home directory");
    };
    if !dir.exists() {
        create_dir_all(&dir).map_err(|e| {
            ErrorReport::with_kind(ErrorKind::Save, format!("Failed to create directory: {e}"))
        })?;
    }
    Ok(dir)
}

/// Where to save a deck that has never been saved.
pub fn suggested_save_path(deck: &Deck) -> Fallible<PathBuf> {
    Ok(default_save_directory()?.join(deck.suggested_file_name()))
}

#[cfg(test)]
mod tests {
    use deckstudio_core::Card;
    use deckstudio_core::CardId;

    use super::*;
    use crate::helper::create_tmp_directory;

    fn sample(n: usize) -> Deck {
        Deck {
            name: "Géographie \u{1F30D}".to_string(),
            cards: (0..n)
                .map(|i| Card {
                    id: CardId::from(format!("id-{i}")),
                    question: format!("Quelle est la capitale n°{i}?"),
                    answer: "東京\n\"Tokyo\"".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_roundtrip() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        for n in [0, 1, 25] {
            let path = dir.join(format!("deck-{n}.json"));
            let deck = sample(n);
            save_deck(&path, &deck)?;
            assert_eq!(load_deck(&path)?, deck);
        }
        Ok(())
    }

    #[test]
    fn test_save_creates_parents() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("a").join("b").join("deck.json");
        save_deck(&path, &sample(1))?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_load_missing_file() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let err = load_deck(&dir.join("nope.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert!(err.message().starts_with("Failed to read:"));
        Ok(())
    }

    #[test]
    fn test_load_malformed_file() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("bad.json");
        write(&path, "not json")?;
        let err = load_deck(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert!(err.message().starts_with("Invalid deck file:"));
        Ok(())
    }

    #[test]
    fn test_save_onto_directory_fails() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let err = save_deck(&dir, &sample(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Save);
        Ok(())
    }
}
