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

use std::path::Path;

use deckstudio_core::Fallible;

use crate::storage::load_deck;
use crate::utils::count_noun;

/// Validate a deck file and summarize it.
pub fn check_deck(path: &Path) -> Fallible<String> {
    let deck = load_deck(path)?;
    Ok(format!("{}: {}", deck.name, count_noun(deck.cards.len(), "card")))
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use deckstudio_core::Card;
    use deckstudio_core::Deck;
    use deckstudio_core::ErrorKind;

    use super::*;
    use crate::helper::create_tmp_directory;
    use crate::storage::save_deck;

    #[test]
    fn test_check_valid_deck() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("deck.json");
        let deck = Deck {
            name: "Biology".to_string(),
            cards: vec![Card::new("Q1", "A1"), Card::new("Q2", "A2")],
        };
        save_deck(&path, &deck)?;
        assert_eq!(check_deck(&path)?, "Biology: 2 cards");
        Ok(())
    }

    #[test]
    fn test_check_invalid_deck() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("deck.json");
        write(&path, r#"{"name": "x"}"#)?;
        let err = check_deck(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        Ok(())
    }
}
