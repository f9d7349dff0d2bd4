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

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use deckstudio_core::Card;
use deckstudio_core::CardField;
use deckstudio_core::CardId;
use deckstudio_core::Direction;
use deckstudio_core::ErrorReport;
use deckstudio_core::Fallible;
use deckstudio_core::MergeMode;
use deckstudio_core::fail;
use deckstudio_core::generation::source_text;
use serde::Deserialize;
use tokio::spawn;

use crate::cmd::studio::state::Connectivity;
use crate::cmd::studio::state::MutableState;
use crate::cmd::studio::state::Pending;
use crate::cmd::studio::state::Replacement;
use crate::cmd::studio::state::ServerState;
use crate::cmd::studio::state::StatusKind;
use crate::cmd::studio::state::View;
use crate::storage::load_deck;
use crate::storage::save_deck;
use crate::storage::suggested_save_path;
use crate::utils::count_noun;

/// Every form on the page posts here. Only `action` is always present; the
/// other fields depend on the action.
#[derive(Deserialize, Default)]
pub struct FormData {
    action: String,
    id: Option<String>,
    target: Option<String>,
    field: Option<String>,
    value: Option<String>,
    question: Option<String>,
    answer: Option<String>,
    path: Option<String>,
    text: Option<String>,
    model: Option<String>,
    choice: Option<String>,
    name: Option<String>,
    view: Option<String>,
    enabled: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum Action {
    View(View),
    New,
    Open(PathBuf),
    Save(Option<PathBuf>),
    SaveAs(PathBuf),
    /// The path box travels with the answer so Save First can use it.
    Confirm(Choice, Option<PathBuf>),
    Generate { text: String, model: String },
    RefreshModels,
    AddCard,
    EditCard { id: CardId, field: CardField, value: String },
    UpdateCard { id: CardId, question: String, answer: String },
    DeleteCard(CardId),
    Move(CardId, Direction),
    Drop { dragged: CardId, target: CardId },
    Rename(String),
    Flip,
    Next,
    Previous,
    Restart,
    Shuffle(bool),
    Shutdown,
}

/// Answers to a [`Pending`] question.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Choice {
    SaveFirst,
    Discard,
    Replace,
    Append,
    Cancel,
}

impl TryFrom<&str> for Choice {
    type Error = ErrorReport;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "save-first" => Ok(Choice::SaveFirst),
            "discard" => Ok(Choice::Discard),
            "replace" => Ok(Choice::Replace),
            "append" => Ok(Choice::Append),
            "cancel" => Ok(Choice::Cancel),
            _ => fail(format!("invalid choice: {value}")),
        }
    }
}

fn required(value: Option<String>, name: &str) -> Fallible<String> {
    match value {
        Some(v) => Ok(v),
        None => fail(format!("missing form field: {name}")),
    }
}

fn required_path(value: Option<String>) -> Fallible<PathBuf> {
    let path = required(value, "path")?;
    let path = path.trim();
    if path.is_empty() {
        fail("Please enter a file path.")
    } else {
        Ok(PathBuf::from(path))
    }
}

fn non_empty_path(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

impl TryFrom<FormData> for Action {
    type Error = ErrorReport;

    fn try_from(form: FormData) -> Result<Self, Self::Error> {
        let id = || -> Fallible<CardId> { Ok(CardId::from(required(form.id.clone(), "id")?)) };
        let action = match form.action.as_str() {
            "View" => Action::View(View::try_from(required(form.view, "view")?.as_str())?),
            "New" => Action::New,
            "Open" => Action::Open(required_path(form.path)?),
            "Save" => Action::Save(non_empty_path(form.path)),
            "Save As" => Action::SaveAs(required_path(form.path)?),
            "Confirm" => Action::Confirm(
                Choice::try_from(required(form.choice, "choice")?.as_str())?,
                non_empty_path(form.path),
            ),
            "Generate" => Action::Generate {
                text: required(form.text, "text")?,
                model: form.model.unwrap_or_default(),
            },
            "Refresh" => Action::RefreshModels,
            "Add Card" => Action::AddCard,
            "EditCard" => Action::EditCard {
                id: id()?,
                field: CardField::try_from(required(form.field, "field")?.as_str())?,
                value: required(form.value, "value")?,
            },
            "Update" => Action::UpdateCard {
                id: id()?,
                question: required(form.question, "question")?,
                answer: required(form.answer, "answer")?,
            },
            "Delete" => Action::DeleteCard(id()?),
            "Up" => Action::Move(id()?, Direction::Up),
            "Down" => Action::Move(id()?, Direction::Down),
            "Drop" => Action::Drop {
                dragged: id()?,
                target: CardId::from(required(form.target, "target")?),
            },
            "Rename" => Action::Rename(required(form.name, "name")?),
            "Flip" => Action::Flip,
            "Next" => Action::Next,
            "Previous" => Action::Previous,
            "Restart" => Action::Restart,
            "Shuffle" => Action::Shuffle(required(form.enabled, "enabled")? == "true"),
            "Shutdown" => Action::Shutdown,
            other => return fail(format!("unknown action: {other}")),
        };
        Ok(action)
    }
}

pub async fn post_handler(State(state): State<ServerState>, Form(form): Form<FormData>) -> Response {
    let action = match Action::try_from(form) {
        Ok(action) => action,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    match action {
        Action::Generate { text, model } => {
            // Run on its own task so a dropped request can't strand the
            // `generating` flag or lose the cards.
            let task = spawn(generate(state.clone(), text, model));
            if let Err(e) = task.await {
                log::warn!("Generation task failed: {e}");
            }
        }
        Action::RefreshModels => refresh_models(&state).await,
        Action::Shutdown => {
            {
                let m = state.mutable.lock().unwrap();
                if m.editor.is_dirty() {
                    log::warn!("Shutting down with unsaved changes");
                }
            }
            if let Some(tx) = state.shutdown_tx.lock().unwrap().take() {
                let _ = tx.send(());
            }
        }
        action => {
            let mut m = state.mutable.lock().unwrap();
            apply(&state, &mut m, action);
        }
    }
    Redirect::to("/").into_response()
}

/// Apply one of the synchronous actions.
fn apply(state: &ServerState, m: &mut MutableState, action: Action) {
    match action {
        Action::View(view) => {
            m.status = None;
            m.switch_view(view);
        }
        Action::New => {
            if busy(m) {
                return;
            }
            if m.editor.is_dirty() {
                m.pending = Some(Pending::Unsaved(Replacement::New));
            } else {
                replace_deck(m, Replacement::New);
            }
        }
        Action::Open(path) => {
            if busy(m) {
                return;
            }
            if m.editor.is_dirty() {
                m.pending = Some(Pending::Unsaved(Replacement::Open(path)));
            } else {
                replace_deck(m, Replacement::Open(path));
            }
        }
        Action::Save(path) => {
            save(m, path);
        }
        Action::SaveAs(path) => {
            save_to(m, path);
        }
        Action::Confirm(choice, path) => confirm(m, choice, path),
        Action::AddCard => {
            m.editor.add_card();
        }
        Action::EditCard { id, field, value } => {
            m.editor.edit_field(&id, field, value);
        }
        Action::UpdateCard {
            id,
            question,
            answer,
        } => {
            if let Some(card) = m.editor.card(&id) {
                let q_changed = card.question != question;
                let a_changed = card.answer != answer;
                if q_changed {
                    m.editor.edit_field(&id, CardField::Question, question);
                }
                if a_changed {
                    m.editor.edit_field(&id, CardField::Answer, answer);
                }
            }
        }
        Action::DeleteCard(id) => {
            m.editor.delete_card(&id);
        }
        Action::Move(id, direction) => {
            m.editor.move_card(&id, direction);
        }
        Action::Drop { dragged, target } => {
            m.editor.reorder_by_drag(&dragged, &target);
        }
        Action::Rename(name) => m.editor.rename_deck(name),
        Action::Flip => {
            if let Some(study) = m.study.as_mut() {
                study.flip();
            }
        }
        Action::Next => {
            if let Some(study) = m.study.as_mut() {
                study.next();
            }
        }
        Action::Previous => {
            if let Some(study) = m.study.as_mut() {
                study.previous();
            }
        }
        Action::Restart => {
            if let Some(study) = m.study.as_mut() {
                study.restart(&mut m.rng);
            }
        }
        Action::Shuffle(enabled) => {
            m.settings.shuffle = enabled;
            persist_settings(state, m);
            if let Some(study) = m.study.as_mut() {
                study.set_shuffle(enabled, &mut m.rng);
            }
        }
        // Handled in `post_handler`.
        Action::Generate { .. } | Action::RefreshModels | Action::Shutdown => {}
    }
}

/// Whether a question is waiting for an answer or a generation is running.
/// Either way, starting something new is refused.
fn busy(m: &mut MutableState) -> bool {
    if m.pending.is_some() {
        m.set_status(StatusKind::Error, "Please answer the question above first.");
        true
    } else if m.generating {
        m.set_status(StatusKind::Error, "Please wait for generation to finish.");
        true
    } else {
        false
    }
}

/// Save to the deck's own path. A deck that was never saved goes to the path
/// from the form, or failing that to the suggested path. Neither of those
/// may replace an existing file: that takes an explicit Save As.
fn save(m: &mut MutableState, form_path: Option<PathBuf>) -> bool {
    if let Some(path) = m.editor.file_path() {
        let path = path.to_path_buf();
        return save_to(m, path);
    }
    let target = match form_path {
        Some(path) => path,
        None => match suggested_save_path(m.editor.deck()) {
            Ok(path) => path,
            Err(e) => {
                m.report(&e);
                return false;
            }
        },
    };
    if target.exists() {
        log::warn!("Refusing to overwrite {}", target.display());
        m.set_status(
            StatusKind::Error,
            format!(
                "{} already exists. Use Save As to replace it.",
                target.display()
            ),
        );
        return false;
    }
    save_to(m, target)
}

/// Write the deck to `path`. On failure the deck stays dirty.
fn save_to(m: &mut MutableState, path: PathBuf) -> bool {
    match save_deck(&path, m.editor.deck()) {
        Ok(()) => {
            log::info!("Saved deck to {}", path.display());
            m.set_status(StatusKind::Success, format!("Saved to {}.", path.display()));
            m.editor.saved(path);
            true
        }
        Err(e) => {
            log::warn!("Save failed: {e}");
            m.report(&e);
            false
        }
    }
}

/// Replace the deck under edit. A failed open leaves everything as it was.
fn replace_deck(m: &mut MutableState, replacement: Replacement) {
    match replacement {
        Replacement::New => {
            m.editor.new_deck();
            m.source_text.clear();
            m.status = None;
            m.switch_view(View::Generate);
        }
        Replacement::Open(path) => match load_deck(&path) {
            Ok(deck) => {
                log::info!("Opened {} ({} cards)", path.display(), deck.cards.len());
                m.set_status(
                    StatusKind::Success,
                    format!("Opened {}.", path.display()),
                );
                m.editor.loaded(deck, path);
                m.switch_view(View::Edit);
            }
            Err(e) => {
                log::warn!("Open failed: {e}");
                m.report(&e);
            }
        },
    }
}

fn confirm(m: &mut MutableState, choice: Choice, path: Option<PathBuf>) {
    let Some(pending) = m.pending.take() else {
        return;
    };
    match (pending, choice) {
        (Pending::Unsaved(replacement), Choice::SaveFirst) => {
            if save(m, path) {
                replace_deck(m, replacement);
            }
        }
        (Pending::Unsaved(replacement), Choice::Discard) => replace_deck(m, replacement),
        (Pending::Merge(cards), Choice::Replace) => merge(m, cards, MergeMode::ReplaceAll),
        (Pending::Merge(cards), Choice::Append) => merge(m, cards, MergeMode::Append),
        (_, Choice::Cancel) => {
            m.status = None;
        }
        // An answer that doesn't fit the question: keep asking.
        (pending, _) => m.pending = Some(pending),
    }
}

fn merge(m: &mut MutableState, cards: Vec<Card>, mode: MergeMode) {
    let n = cards.len();
    m.editor.merge_generated(cards, mode);
    m.set_status(
        StatusKind::Success,
        format!("Generated {} successfully.", count_noun(n, "flashcard")),
    );
    m.switch_view(View::Edit);
}

fn persist_settings(state: &ServerState, m: &MutableState) {
    if let Some(path) = &state.settings_path {
        if let Err(e) = m.settings.save(path) {
            log::warn!("Failed to save settings: {e}");
        }
    }
}

/// Run the generator without holding the lock, then merge the result.
async fn generate(state: ServerState, text: String, model: String) {
    {
        let mut m = state.mutable.lock().unwrap();
        m.source_text = text.clone();
        if let Err(e) = source_text(&text) {
            m.report(&e);
            return;
        }
        if m.connectivity == Connectivity::Unavailable {
            m.set_status(
                StatusKind::Error,
                "Ollama is not connected. Please start Ollama first.",
            );
            return;
        }
        if m.generating {
            m.set_status(StatusKind::Error, "Already generating. Please wait.");
            return;
        }
        if m.pending.is_some() {
            m.set_status(StatusKind::Error, "Please answer the question above first.");
            return;
        }
        m.generating = true;
        if !model.is_empty() && m.settings.model.as_deref() != Some(model.as_str()) {
            m.settings.model = Some(model.clone());
            persist_settings(&state, &m);
        }
    }

    log::info!("Generating flashcards");
    let result = state.ollama.generate_cards(&text, &model).await;

    let mut m = state.mutable.lock().unwrap();
    m.generating = false;
    match result {
        Err(e) => {
            log::warn!("Generation failed: {e}");
            m.report(&e);
        }
        Ok(cards) if cards.is_empty() => {
            m.set_status(
                StatusKind::Error,
                "No flashcards were generated. Try different text or regenerate.",
            );
        }
        Ok(cards) => {
            log::info!("Generated {} cards", cards.len());
            if m.editor.needs_merge_choice() {
                let message = format!(
                    "You already have {}. Replace them or add {} new cards?",
                    count_noun(m.editor.len(), "card"),
                    cards.len()
                );
                m.set_status(StatusKind::Info, message);
                m.pending = Some(Pending::Merge(cards));
            } else {
                merge(&mut m, cards, MergeMode::ReplaceAll);
            }
        }
    }
}

/// Probe the model server and record the outcome.
pub async fn refresh_models(state: &ServerState) {
    let connectivity = match state.ollama.list_models().await {
        Ok(models) => {
            log::info!("Ollama connected ({} models)", models.len());
            Connectivity::Connected(models)
        }
        Err(e) => {
            log::warn!("Ollama unavailable: {e}");
            Connectivity::Unavailable
        }
    };
    state.mutable.lock().unwrap().connectivity = connectivity;
}
