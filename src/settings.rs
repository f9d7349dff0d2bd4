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

//! User preferences that outlive a single run, stored as TOML.

use std::fs::create_dir_all;
use std::fs::read_to_string;
use std::fs::write;
use std::path::Path;
use std::path::PathBuf;

use deckstudio_core::ErrorReport;
use deckstudio_core::Fallible;
use serde::Deserialize;
use serde::Serialize;

use crate::ollama::DEFAULT_OLLAMA_URL;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether study sessions shuffle the cards.
    pub shuffle: bool,
    /// The model last used for generation.
    pub model: Option<String>,
    /// Base URL of the Ollama server.
    pub ollama_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shuffle: false,
            model: None,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = read_to_string(path)?;
        toml::from_str(&text).map_err(|e| {
            ErrorReport::new(format!(
                "Invalid settings file '{}': {e}",
                path.display()
            ))
        })
    }

    pub fn save(&self, path: &Path) -> Fallible<()> {
        let text = toml::to_string_pretty(self)
            .map_err(|e| ErrorReport::new(format!("Failed to encode settings: {e}")))?;
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        write(path, text)?;
        Ok(())
    }
}

/// `<config dir>/deckstudio/settings.toml`, if the platform has a config
/// directory.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("deckstudio").join("settings.toml"))
}

/// Load settings from an explicit path, the default path, or nowhere.
pub fn load_settings(path: Option<&Path>) -> Fallible<(Settings, Option<PathBuf>)> {
    let path: Option<PathBuf> = match path {
        Some(p) => Some(p.to_path_buf()),
        None => default_settings_path(),
    };
    let settings = match &path {
        Some(p) => Settings::load(p)?,
        None => Settings::default(),
    };
    Ok((settings, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_directory;

    #[test]
    fn test_missing_file_is_default() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let settings = Settings::load(&dir.join("settings.toml"))?;
        assert_eq!(settings, Settings::default());
        assert!(!settings.shuffle);
        assert_eq!(settings.ollama_url, "http://localhost:11434");
        Ok(())
    }

    #[test]
    fn test_roundtrip() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("nested").join("settings.toml");
        let settings = Settings {
            shuffle: true,
            model: Some("llama3".to_string()),
            ollama_url: "http://10.0.0.2:11434".to_string(),
        };
        settings.save(&path)?;
        assert_eq!(Settings::load(&path)?, settings);
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("settings.toml");
        write(&path, "shuffle = true\n")?;
        let settings = Settings::load(&path)?;
        assert!(settings.shuffle);
        assert_eq!(settings.model, None);
        assert_eq!(settings.ollama_url, DEFAULT_OLLAMA_URL);
        Ok(())
    }

    #[test]
    fn test_malformed_file() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("settings.toml");
        write(&path, "shuffle = \"maybe\"\n")?;
        let err = Settings::load(&path).unwrap_err();
        assert!(err.message().starts_with("Invalid settings file"));
        Ok(())
    }
}
