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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use deckstudio_core::Card;
use deckstudio_core::Editor;
use deckstudio_core::StudySession;
use deckstudio_core::generation::DEFAULT_MODEL;
use maud::Markup;
use maud::html;

use crate::cmd::studio::state::Connectivity;
use crate::cmd::studio::state::MutableState;
use crate::cmd::studio::state::Pending;
use crate::cmd::studio::state::Replacement;
use crate::cmd::studio::state::ServerState;
use crate::cmd::studio::state::View;
use crate::cmd::studio::template::page_template;
use crate::storage::deck_directory;
use crate::utils::count_noun;

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let m = state.mutable.lock().unwrap();
    let body = render_page(&m);
    let html = page_template(&m.editor.deck().name, body).into_string();
    (StatusCode::OK, Html(html))
}

fn render_page(m: &MutableState) -> Markup {
    let body = match m.view {
        View::Generate => render_generate(m),
        View::Edit => render_edit(&m.editor),
        View::Study => render_study(&m.editor, m.study.as_ref(), m.settings.shuffle),
    };
    html! {
        div.root {
            (render_header(m))
            (render_tabs(m.view))
            (render_status(m))
            (render_pending(m))
            main.view {
                (body)
            }
        }
    }
}

fn render_header(m: &MutableState) -> Markup {
    let editor = &m.editor;
    html! {
        header.topbar {
            div.deck-title {
                h1 #deck-name { (editor.deck().name) }
                span.card-count { (count_noun(editor.len(), "card")) }
                @if editor.is_dirty() {
                    span.unsaved-dot title="Unsaved changes" { "\u{25CF}" }
                }
            }
            form.file-actions action="/" method="post" {
                input type="text" name="path" value=(save_path_value(editor)) size="40"
                    title="Deck file path";
                input #new type="submit" name="action" value="New"
                    title="Start a new deck. Shortcut: Ctrl+N.";
                input #open type="submit" name="action" value="Open"
                    title="Open the deck at this path. Shortcut: Ctrl+O.";
                input #save type="submit" name="action" value="Save" title="Save. Shortcut: Ctrl+S.";
                input type="submit" name="action" value="Save As" title="Save to this path.";
                input.shutdown-button type="submit" name="action" value="Shutdown"
                    title="Shut down the server";
            }
        }
    }
}

/// The path shown in the file box: the deck's own file, or a suggestion in
/// the default deck directory.
fn save_path_value(editor: &Editor) -> String {
    match editor.file_path() {
        Some(path) => path.display().to_string(),
        None => {
            let name = editor.deck().suggested_file_name();
            match deck_directory() {
                Some(dir) => dir.join(name).display().to_string(),
                None => name,
            }
        }
    }
}

fn render_tabs(current: View) -> Markup {
    html! {
        nav.tabs {
            @for view in View::ALL {
                form.tab-form action="/" method="post" {
                    input type="hidden" name="view" value=(view.as_str());
                    button.tab.active[view == current] type="submit" name="action" value="View"
                        data-view=(view.as_str()) {
                        (view.label())
                    }
                }
            }
        }
    }
}

fn render_status(m: &MutableState) -> Markup {
    html! {
        @if let Some(status) = &m.status {
            div class=(format!("status-msg {}", status.kind.as_str())) {
                (status.message)
            }
        }
    }
}

fn render_pending(m: &MutableState) -> Markup {
    let Some(pending) = &m.pending else {
        return html! {};
    };
    let (prompt, choices): (String, Vec<(&str, &str)>) = match pending {
        Pending::Unsaved(replacement) => {
            let prompt = match replacement {
                Replacement::New => "Save current deck before creating a new one?",
                Replacement::Open(_) => "Save current deck before opening another?",
            };
            (
                prompt.to_string(),
                vec![
                    ("save-first", "Save First"),
                    ("discard", "Discard"),
                    ("cancel", "Cancel"),
                ],
            )
        }
        Pending::Merge(cards) => (
            format!(
                "You already have {}. Replace them or add {} new cards?",
                count_noun(m.editor.len(), "card"),
                cards.len()
            ),
            vec![
                ("replace", "Replace All"),
                ("append", "Add to Existing"),
                ("cancel", "Cancel"),
            ],
        ),
    };
    html! {
        div.confirm {
            p.confirm-prompt { (prompt) }
            form action="/" method="post" {
                input type="hidden" name="action" value="Confirm";
                input type="hidden" name="path" value=(save_path_value(&m.editor));
                @for (value, label) in choices {
                    button type="submit" name="choice" value=(value) { (label) }
                }
            }
        }
    }
}

fn render_generate(m: &MutableState) -> Markup {
    let (dot, text) = match &m.connectivity {
        Connectivity::Unknown => ("status-dot", "Checking Ollama\u{2026}".to_string()),
        Connectivity::Connected(models) => (
            "status-dot connected",
            format!("Ollama connected ({})", count_noun(models.len(), "model")),
        ),
        Connectivity::Unavailable => ("status-dot error", "Ollama not running".to_string()),
    };
    let selected = m.settings.model.as_deref().unwrap_or(DEFAULT_MODEL);
    let models: Vec<(String, String)> = match &m.connectivity {
        Connectivity::Connected(models) if !models.is_empty() => models
            .iter()
            .map(|name| (name.clone(), name.clone()))
            .collect(),
        _ => vec![(
            DEFAULT_MODEL.to_string(),
            format!("{DEFAULT_MODEL} (not installed)"),
        )],
    };
    let generate_disabled = m.generating || m.connectivity == Connectivity::Unavailable;
    html! {
        section.generate {
            div.connectivity {
                span class=(dot) {}
                span #ollama-text { (text) }
                form.inline action="/" method="post" {
                    input type="submit" name="action" value="Refresh" title="Check Ollama again";
                }
            }
            form.generate-form action="/" method="post" {
                textarea #source-text name="text" rows="14"
                    placeholder="Paste the text to turn into flashcards\u{2026}" {
                    (m.source_text)
                }
                div.generate-controls {
                    select #model-picker name="model" {
                        @for (value, label) in &models {
                            option value=(value) selected[value == selected] { (label) }
                        }
                    }
                    @if m.generating {
                        input #generate type="submit" name="action" value="Generate" disabled;
                        span.spinner { "Generating\u{2026}" }
                    } @else {
                        input #generate type="submit" name="action" value="Generate"
                            disabled[generate_disabled];
                    }
                }
            }
        }
    }
}

fn render_edit(editor: &Editor) -> Markup {
    html! {
        section.edit {
            form.rename-form action="/" method="post" {
                input #edit-deck-name type="text" name="name" value=(editor.deck().name);
                input type="submit" name="action" value="Rename";
            }
            div #card-list {
                @if editor.is_empty() {
                    div.empty-state { "No flashcards yet. Generate some or add manually." }
                } @else {
                    @for (i, card) in editor.cards().iter().enumerate() {
                        (render_card_item(i, card))
                    }
                }
            }
            form action="/" method="post" {
                input #add-card type="submit" name="action" value="Add Card";
            }
        }
    }
}

fn render_card_item(i: usize, card: &Card) -> Markup {
    let id = card.id.as_str();
    html! {
        div.card-item data-id=(id) draggable="true" {
            div.card-num { (i + 1) }
            form.card-fields action="/" method="post" {
                input type="hidden" name="id" value=(id);
                div.card-field {
                    label { "Question" }
                    textarea rows="2" name="question" data-card-id=(id) data-field="question" {
                        (card.question)
                    }
                }
                div.card-field {
                    label { "Answer" }
                    textarea rows="2" name="answer" data-card-id=(id) data-field="answer" {
                        (card.answer)
                    }
                }
                input.update type="submit" name="action" value="Update";
            }
            form.card-actions action="/" method="post" {
                input type="hidden" name="id" value=(id);
                span.drag-handle title="Drag to reorder" { "\u{283F}" }
                button type="submit" name="action" value="Up" title="Move up" { "\u{2191}" }
                button type="submit" name="action" value="Down" title="Move down" { "\u{2193}" }
                button.delete type="submit" name="action" value="Delete" title="Delete" {
                    "\u{2715}"
                }
            }
        }
    }
}

fn render_study(editor: &Editor, study: Option<&StudySession>, shuffle: bool) -> Markup {
    let toggle = html! {
        form.inline action="/" method="post" {
            input type="hidden" name="enabled" value=(if shuffle { "false" } else { "true" });
            button #shuffle-mode type="submit" name="action" value="Shuffle" {
                @if shuffle { "Shuffle: On" } @else { "Shuffle: Off" }
            }
        }
    };
    // The session snapshot may outlive a card if the deck changed underneath
    // it; treat that like an empty session.
    let current: Option<(&Card, &StudySession)> = study.and_then(|s| {
        s.current()
            .ok()
            .and_then(|idx| editor.cards().get(idx))
            .map(|card| (card, s))
    });
    let Some((card, session)) = current else {
        return html! {
            section.study {
                (toggle)
                div #study-empty.empty-state { "No cards to study. Generate or add some first." }
            }
        };
    };
    let (position, total) = session.progress().unwrap_or((0, 0));
    html! {
        section.study {
            div.study-toolbar {
                span.study-counter { (position) " / " (total) }
                (toggle)
            }
            form #study-card action="/" method="post" {
                button.study-card-inner.flipped[session.is_flipped()] type="submit" name="action"
                    value="Flip" title="Flip the card. Shortcut: space." {
                    div.study-question { (card.question) }
                    @if session.is_flipped() {
                        div.study-answer { (card.answer) }
                    }
                }
            }
            form.study-controls action="/" method="post" {
                input #prev type="submit" name="action" value="Previous" title="Shortcut: left arrow.";
                input #flip type="submit" name="action" value="Flip" title="Shortcut: space.";
                input #next type="submit" name="action" value="Next" title="Shortcut: right arrow.";
                input #restart type="submit" name="action" value="Restart";
            }
        }
    }
}
