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

use deckstudio_core::Fallible;

use crate::ollama::OllamaClient;

/// One installed model per line.
pub async fn list_models(client: &OllamaClient) -> Fallible<String> {
    let models = client.list_models().await?;
    if models.is_empty() {
        Ok("No models installed.".to_string())
    } else {
        Ok(models.join("\n"))
    }
}
