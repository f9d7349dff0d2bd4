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

//! The model-independent half of card generation: validating the source
//! text, building the prompt, and turning the model's JSON into cards.

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail_with;
use crate::types::card::Card;

/// Used when the caller does not pick a model.
pub const DEFAULT_MODEL: &str = "mistral";

/// A question/answer pair as produced by the model. Ids are assigned when
/// these become [`Card`]s.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCard {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedCards {
    cards: Vec<GeneratedCard>,
}

impl From<GeneratedCard> for Card {
    fn from(value: GeneratedCard) -> Self {
        Card::new(value.question, value.answer)
    }
}

/// Trim the source text, rejecting it if nothing is left.
pub fn source_text(text: &str) -> Fallible<&str> {
    let text = text.trim();
    if text.is_empty() {
        fail_with(ErrorKind::EmptyInput, "Please enter some text first.")
    } else {
        Ok(text)
    }
}

pub fn resolve_model(model: &str) -> &str {
    let model = model.trim();
    if model.is_empty() {
        DEFAULT_MODEL
    } else {
        model
    }
}

pub fn build_prompt(text: &str) -> String {
    format!(
        r#"You are a flashcard generator. Analyze the following text and create high-quality study flashcards.

Rules:
- Extract the most important concepts, facts, and relationships.
- Each flashcard must have a clear, specific question and a concise, accurate answer.
- Aim for 5-15 flashcards depending on content density.
- Questions should test understanding, not just recall.
- Answers should be brief but complete.

Respond with ONLY valid JSON in this exact format:
{{"cards": [{{"question": "...", "answer": "..."}}, ...]}}

Text to analyze:
{text}"#
    )
}

/// Parse the model's reply into cards with fresh ids.
pub fn parse_generated(reply: &str) -> Fallible<Vec<Card>> {
    let generated: GeneratedCards = serde_json::from_str(reply).map_err(|e| {
        ErrorReport::with_kind(
            ErrorKind::Generation,
            format!("LLM returned invalid JSON. Try regenerating.\n{e}"),
        )
    })?;
    Ok(generated.cards.into_iter().map(Card::from).collect())
}
