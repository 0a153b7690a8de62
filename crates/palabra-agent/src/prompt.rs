// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System instruction resolution.

use tracing::{info, warn};

/// Loads the system prompt following priority: file > inline > default.
///
/// An unreadable or empty file falls through to the next source.
pub async fn load_system_prompt(
    agent_name: &str,
    inline_prompt: Option<&str>,
    prompt_file: Option<&str>,
) -> String {
    if let Some(file_path) = prompt_file {
        match tokio::fs::read_to_string(file_path).await {
            Ok(content) => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    info!(path = file_path, "loaded system prompt from file");
                    return trimmed.to_string();
                }
                warn!(path = file_path, "system prompt file is empty, falling back");
            }
            Err(e) => {
                warn!(
                    path = file_path,
                    error = %e,
                    "failed to read system prompt file, falling back"
                );
            }
        }
    }

    if let Some(prompt) = inline_prompt
        && !prompt.trim().is_empty()
    {
        return prompt.to_string();
    }

    format!("You are {agent_name}, a concise assistant.")
}
