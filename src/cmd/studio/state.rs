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
use std::sync::Arc;
use std::sync::Mutex;

use deckstudio_core::Card;
use deckstudio_core::Editor;
use deckstudio_core::ErrorReport;
use deckstudio_core::StudySession;
use deckstudio_core::fail;
use deckstudio_core::rng::TinyRng;
use tokio::sync::oneshot;

use crate::ollama::OllamaClient;
use crate::settings::Settings;

#[derive(Clone)]
pub struct ServerState {
    pub ollama: OllamaClient,
    /// Where preference changes are written. `None` keeps them in memory.
    pub settings_path: Option<PathBuf>,
    pub mutable: Arc<Mutex<MutableState>>,
    pub shutdown_tx: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

pub struct MutableState {
    pub editor: Editor,
    /// Present only while the study view is shown.
    pub study: Option<StudySession>,
    pub rng: TinyRng,
    pub view: View,
    pub settings: Settings,
    pub connectivity: Connectivity,
    /// The text last submitted for generation, kept to refill the form.
    pub source_text: String,
    pub status: Option<Status>,
    pub pending: Option<Pending>,
    /// A generation request is in flight. Further requests are refused.
    pub generating: bool,
}

impl MutableState {
    pub fn new(editor: Editor, settings: Settings, rng: TinyRng) -> Self {
        Self {
            editor,
            study: None,
            rng,
            view: View::Generate,
            settings,
            connectivity: Connectivity::Unknown,
            source_text: String::new(),
            status: None,
            pending: None,
            generating: false,
        }
    }

    /// Switch views. Entering the study view always starts a new session;
    /// leaving it throws the session away.
    pub fn switch_view(&mut self, view: View) {
        self.view = view;
        self.study = match view {
            View::Study => Some(StudySession::start(
                self.editor.len(),
                self.settings.shuffle,
                &mut self.rng,
            )),
            _ => None,
        };
    }

    pub fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.status = Some(Status {
            kind,
            message: message.into(),
        });
    }

    pub fn report(&mut self, error: &ErrorReport) {
        self.set_status(StatusKind::Error, error.message());
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Generate,
    Edit,
    Study,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Generate => "generate",
            View::Edit => "edit",
            View::Study => "study",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Generate => "Generate",
            View::Edit => "Edit",
            View::Study => "Study",
        }
    }

    pub const ALL: [View; 3] = [View::Generate, View::Edit, View::Study];
}

impl TryFrom<&str> for View {
    type Error = ErrorReport;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "generate" => Ok(View::Generate),
            "edit" => Ok(View::Edit),
            "study" => Ok(View::Study),
            _ => fail(format!("invalid view: {value}")),
        }
    }
}

/// Whether the model server answered the last probe.
#[derive(Clone, Debug, PartialEq)]
pub enum Connectivity {
    Unknown,
    Connected(Vec<String>),
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Info => "info",
            StatusKind::Success => "success",
            StatusKind::Error => "error",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

/// What the user is being asked to decide.
pub enum Pending {
    /// The deck has unsaved changes and is about to be replaced.
    Unsaved(Replacement),
    /// Generated cards are waiting to be merged into a non-empty deck.
    Merge(Vec<Card>),
}

/// An action that replaces the deck under edit.
#[derive(Clone, Debug, PartialEq)]
pub enum Replacement {
    New,
    Open(PathBuf),
}
