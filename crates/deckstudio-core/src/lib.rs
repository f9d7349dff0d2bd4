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

//! deckstudio-core: Core library for the deckstudio flashcard editor.
//!
//! This library provides I/O-free types and algorithms for:
//! - The deck data model and its JSON file format
//! - The deck editor (editing, reordering, dirty tracking)
//! - Study sessions (ordering, shuffling, cursor and flip state)
//! - The model-independent parts of card generation

pub mod editor;
pub mod error;
pub mod generation;
pub mod rng;
pub mod study;
pub mod types;

// Re-exports for convenience
pub use editor::{Direction, Editor, MergeMode};
pub use error::{ErrorKind, ErrorReport, Fallible, fail, fail_with};
pub use study::StudySession;
pub use types::card::{Card, CardField};
pub use types::card_id::CardId;
pub use types::deck::Deck;
