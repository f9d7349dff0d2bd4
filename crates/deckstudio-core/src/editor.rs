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

//! The deck editor: the single owner of the deck under edit.
//!
//! Every operation here is synchronous and infallible. Operations that
//! address a card by id silently do nothing when the id is gone (a stale
//! reference from the UI is not an error), and return `false` to say so.
//!
//! `dirty` is true iff the deck was mutated since the last successful load or
//! save. Mutations set it; only the persistence flow clears it.

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use crate::types::card::Card;
use crate::types::card::CardField;
use crate::types::card_id::CardId;
use crate::types::deck::Deck;

/// Direction for a one-step move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    fn offset(self) -> isize {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

/// How generated cards are merged into a deck that already has cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeMode {
    ReplaceAll,
    Append,
}

#[derive(Debug, Default)]
pub struct Editor {
    deck: Deck,
    file_path: Option<PathBuf>,
    dirty: bool,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn cards(&self) -> &[Card] {
        &self.deck.cards
    }

    pub fn len(&self) -> usize {
        self.deck.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deck.cards.is_empty()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn position(&self, id: &CardId) -> Option<usize> {
        self.deck.cards.iter().position(|c| &c.id == id)
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.deck.cards.iter().find(|c| &c.id == id)
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Append a blank card and return its id.
    pub fn add_card(&mut self) -> CardId {
        let card = Card::blank();
        let id = card.id.clone();
        self.deck.cards.push(card);
        self.mark_dirty();
        id
    }

    pub fn edit_field(&mut self, id: &CardId, field: CardField, value: impl Into<String>) -> bool {
        match self.deck.cards.iter_mut().find(|c| &c.id == id) {
            Some(card) => {
                card.set_field(field, value.into());
                self.mark_dirty();
                true
            }
            None => false,
        }
    }

    pub fn delete_card(&mut self, id: &CardId) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.deck.cards.remove(idx);
                self.mark_dirty();
                true
            }
            None => false,
        }
    }

    /// Move a card one step. Moving past either end does nothing and leaves
    /// the dirty flag alone.
    pub fn move_card(&mut self, id: &CardId, direction: Direction) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        let new_idx = idx as isize + direction.offset();
        if new_idx < 0 || new_idx as usize >= self.deck.cards.len() {
            return false;
        }
        let card = self.deck.cards.remove(idx);
        self.deck.cards.insert(new_idx as usize, card);
        self.mark_dirty();
        true
    }

    /// Drop `dragged` onto `target`.
    ///
    /// The target's index is taken before the dragged card is lifted out,
    /// then the card is removed and reinserted at that index. Dragging up
    /// lands the card where the target was (pushing the target down);
    /// dragging down lands it just after the target.
    pub fn reorder_by_drag(&mut self, dragged: &CardId, target: &CardId) -> bool {
        if dragged == target {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(dragged), self.position(target)) else {
            return false;
        };
        let card = self.deck.cards.remove(from);
        self.deck.cards.insert(to, card);
        self.mark_dirty();
        true
    }

    pub fn rename_deck(&mut self, name: impl Into<String>) {
        self.deck.name = name.into();
        self.mark_dirty();
    }

    /// Discard every card and take `cards` instead.
    pub fn replace_all(&mut self, cards: Vec<Card>) {
        self.deck.cards = Vec::new();
        self.append_all(cards);
    }

    /// Concatenate `cards` after the existing ones. Any incoming card whose
    /// id is already taken gets a fresh one.
    pub fn append_all(&mut self, cards: Vec<Card>) {
        let mut taken: HashSet<CardId> = self.deck.cards.iter().map(|c| c.id.clone()).collect();
        for mut card in cards {
            while taken.contains(&card.id) {
                card.id = CardId::fresh();
            }
            taken.insert(card.id.clone());
            self.deck.cards.push(card);
        }
        self.mark_dirty();
    }

    /// Whether merging generated cards needs the user to pick a mode.
    pub fn needs_merge_choice(&self) -> bool {
        !self.is_empty()
    }

    /// Merge generated cards. With an empty deck the mode is irrelevant.
    pub fn merge_generated(&mut self, cards: Vec<Card>, mode: MergeMode) {
        match mode {
            MergeMode::ReplaceAll => self.replace_all(cards),
            MergeMode::Append => self.append_all(cards),
        }
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Start over with an untitled empty deck that has never been saved.
    pub fn new_deck(&mut self) {
        self.deck = Deck::default();
        self.file_path = None;
        self.mark_clean();
    }

    /// Take a freshly loaded deck wholesale.
    pub fn loaded(&mut self, deck: Deck, path: PathBuf) {
        self.deck = deck;
        self.file_path = Some(path);
        self.mark_clean();
    }

    /// Record a successful save to `path`.
    pub fn saved(&mut self, path: PathBuf) {
        self.file_path = Some(path);
        self.mark_clean();
    }
}
