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

//! Study sessions: a snapshot of card indices, optionally shuffled, walked
//! with a saturating cursor.
//!
//! The order is fixed when the session starts. Edits made to the deck after
//! that are not observed; rebuild the session to pick them up.

use crate::error::ErrorKind;
use crate::error::Fallible;
use crate::error::fail_with;
use crate::rng::TinyRng;
use crate::rng::shuffle;

#[derive(Debug, Clone, PartialEq)]
pub struct StudySession {
    /// A permutation of `0..card_count`. Empty when there are no cards.
    order: Vec<usize>,
    cursor: usize,
    flipped: bool,
    shuffle: bool,
}

impl StudySession {
    /// Build a session over `card_count` cards.
    pub fn start(card_count: usize, shuffle_enabled: bool, rng: &mut TinyRng) -> Self {
        let mut order: Vec<usize> = (0..card_count).collect();
        if shuffle_enabled {
            shuffle(&mut order, rng);
        }
        Self {
            order,
            cursor: 0,
            flipped: false,
            shuffle: shuffle_enabled,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle
    }

    /// The deck index of the card under the cursor.
    pub fn current(&self) -> Fallible<usize> {
        match self.order.get(self.cursor) {
            Some(idx) => Ok(*idx),
            None => fail_with(ErrorKind::NoCurrentCard, "There are no cards to study."),
        }
    }

    /// 1-based position and total, for display.
    pub fn progress(&self) -> Option<(usize, usize)> {
        if self.is_empty() {
            None
        } else {
            Some((self.cursor + 1, self.order.len()))
        }
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    /// Advance the cursor. Returns false at the last card.
    pub fn next(&mut self) -> bool {
        if self.cursor + 1 < self.order.len() {
            self.cursor += 1;
            self.flipped = false;
            true
        } else {
            false
        }
    }

    /// Step the cursor back. Returns false at the first card.
    pub fn previous(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.flipped = false;
            true
        } else {
            false
        }
    }

    /// Start over with the same card count and shuffle preference. A
    /// shuffled session draws a fresh order.
    pub fn restart(&mut self, rng: &mut TinyRng) {
        *self = Self::start(self.order.len(), self.shuffle, rng);
    }

    /// Change the shuffle preference and rebuild.
    pub fn set_shuffle(&mut self, enabled: bool, rng: &mut TinyRng) {
        *self = Self::start(self.order.len(), enabled, rng);
    }
}
