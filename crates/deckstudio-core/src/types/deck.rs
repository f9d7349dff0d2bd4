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

use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail_with;
use crate::types::card::Card;

pub const UNTITLED: &str = "Untitled Deck";

/// A named, ordered collection of cards. This is the unit of persistence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub cards: Vec<Card>,
}

impl Default for Deck {
    fn default() -> Self {
        Self {
            name: UNTITLED.to_string(),
            cards: Vec::new(),
        }
    }
}

impl Deck {
    /// Decode a deck file. Duplicate ids are rejected.
    pub fn from_json(text: &str) -> Fallible<Self> {
        let deck: Deck = serde_json::from_str(text).map_err(|e| {
            ErrorReport::with_kind(ErrorKind::Load, format!("Invalid deck file: {e}"))
        })?;
        deck.check_unique_ids()?;
        Ok(deck)
    }

    pub fn to_json(&self) -> Fallible<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ErrorReport::with_kind(ErrorKind::Save, format!("Serialization error: {e}"))
        })
    }

    fn check_unique_ids(&self) -> Fallible<()> {
        let mut seen = HashSet::new();
        for card in &self.cards {
            if !seen.insert(&card.id) {
                return fail_with(
                    ErrorKind::Load,
                    format!("Invalid deck file: duplicate card id '{}'", card.id),
                );
            }
        }
        Ok(())
    }

    /// A file name suggested for saving this deck: the name stripped to
    /// ASCII letters, digits, and spaces.
    pub fn suggested_file_name(&self) -> String {
        let stem: String = self
            .name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
            .collect();
        let stem = stem.trim();
        if stem.is_empty() {
            format!("{UNTITLED}.json")
        } else {
            format!("{stem}.json")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::card_id::CardId;

    fn card(id: &str, q: &str, a: &str) -> Card {
        Card {
            id: CardId::from(id),
            question: q.to_string(),
            answer: a.to_string(),
        }
    }

    #[test]
    fn test_default_is_untitled_and_empty() {
        let deck = Deck::default();
        assert_eq!(deck.name, "Untitled Deck");
        assert!(deck.cards.is_empty());
    }

    #[test]
    fn test_roundtrip_preserves_everything() -> Fallible<()> {
        let cases = vec![
            Deck {
                name: "Empty".to_string(),
                cards: vec![],
            },
            Deck {
                name: "Один".to_string(),
                cards: vec![card("a", "¿Qué?", "日本語 \u{1F600}")],
            },
            Deck {
                name: "Many \"quoted\"\nlines".to_string(),
                cards: vec![
                    card("c", "Q3", "A3"),
                    card("a", "", ""),
                    card("b", "line\nbreak", "tab\there"),
                ],
            },
        ];
        for deck in cases {
            let text = deck.to_json()?;
            assert_eq!(Deck::from_json(&text)?, deck);
        }
        Ok(())
    }

    #[test]
    fn test_format_field_names() -> Fallible<()> {
        let deck = Deck {
            name: "D".to_string(),
            cards: vec![card("x", "Q", "A")],
        };
        let value: serde_json::Value = serde_json::from_str(&deck.to_json()?)?;
        assert_eq!(value["name"], "D");
        assert_eq!(value["cards"][0]["id"], "x");
        assert_eq!(value["cards"][0]["question"], "Q");
        assert_eq!(value["cards"][0]["answer"], "A");
        Ok(())
    }

    #[test]
    fn test_malformed_is_load_error() {
        let err = Deck::from_json("{\"name\": 3}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let text = r#"{"name": "D", "cards": [
            {"id": "a", "question": "", "answer": ""},
            {"id": "a", "question": "", "answer": ""}
        ]}"#;
        let err = Deck::from_json(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert!(err.message().contains("duplicate card id 'a'"));
    }

    #[test]
    fn test_suggested_file_name() {
        let mut deck = Deck::default();
        assert_eq!(deck.suggested_file_name(), "Untitled Deck.json");
        deck.name = "Chem 101: Acids/Bases!".to_string();
        assert_eq!(deck.suggested_file_name(), "Chem 101 AcidsBases.json");
        deck.name = "???".to_string();
        assert_eq!(deck.suggested_file_name(), "Untitled Deck.json");
    }
}
