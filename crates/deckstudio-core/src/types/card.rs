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

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::types::card_id::CardId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub question: String,
    pub answer: String,
}

impl Card {
    /// A card with a fresh id and empty faces.
    pub fn blank() -> Self {
        Self {
            id: CardId::fresh(),
            question: String::new(),
            answer: String::new(),
        }
    }

    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: CardId::fresh(),
            question: question.into(),
            answer: answer.into(),
        }
    }

    pub fn field(&self, field: CardField) -> &str {
        match field {
            CardField::Question => &self.question,
            CardField::Answer => &self.answer,
        }
    }

    pub fn set_field(&mut self, field: CardField, value: String) {
        match field {
            CardField::Question => self.question = value,
            CardField::Answer => self.answer = value,
        }
    }
}

/// The editable text fields of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardField {
    Question,
    Answer,
}

impl CardField {
    pub fn as_str(&self) -> &str {
        match self {
            CardField::Question => "question",
            CardField::Answer => "answer",
        }
    }
}

impl TryFrom<&str> for CardField {
    type Error = ErrorReport;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "question" => Ok(CardField::Question),
            "answer" => Ok(CardField::Answer),
            _ => fail(format!("invalid card field: {value}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_field_parse() -> Fallible<()> {
        assert_eq!(CardField::try_from("question")?, CardField::Question);
        assert_eq!(CardField::try_from("answer")?, CardField::Answer);
        assert!(CardField::try_from("hint").is_err());
        Ok(())
    }

    #[test]
    fn test_set_field() {
        let mut card = Card::blank();
        card.set_field(CardField::Answer, "42".to_string());
        assert_eq!(card.field(CardField::Answer), "42");
        assert_eq!(card.field(CardField::Question), "");
    }
}
