// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Palabra chat assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Palabra configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PalabraConfig {
    /// Assistant identity, persona, and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Session principal settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Completion service settings.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Conversation log settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Placeholder texts shown when a turn fails.
    #[serde(default)]
    pub notices: NoticesConfig,
}

/// Assistant identity and persona configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt string. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a markdown file containing the system prompt.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,

    /// Disclaimer printed under the conversation by the shell.
    #[serde(default)]
    pub disclaimer: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
            disclaimer: None,
        }
    }
}

fn default_agent_name() -> String {
    "palabra".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Session principal configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Principal signed in at startup. `None` starts signed out.
    #[serde(default)]
    pub principal: Option<String>,
}

/// Completion service configuration (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionConfig {
    /// Bearer credential. `None` falls back to the `GROQ_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Full URL of the chat-completions endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds. `None` waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

/// Conversation log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Collection every message record is appended to.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            collection: default_collection(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("palabra").join("palabra.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("palabra.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_collection() -> String {
    "chat-messages".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Assistant-authored placeholder texts, one per failure condition.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NoticesConfig {
    /// Shown when no completion credential is configured.
    #[serde(default = "default_missing_credential")]
    pub missing_credential: String,

    /// Shown on a non-success HTTP status. `{status}` is replaced by the code.
    #[serde(default = "default_http_error")]
    pub http_error: String,

    /// Shown when a successful response carries no text.
    #[serde(default = "default_empty_response")]
    pub empty_response: String,

    /// Shown for transport, decoding, and other unexpected failures.
    #[serde(default = "default_unexpected")]
    pub unexpected: String,
}

impl Default for NoticesConfig {
    fn default() -> Self {
        Self {
            missing_credential: default_missing_credential(),
            http_error: default_http_error(),
            empty_response: default_empty_response(),
            unexpected: default_unexpected(),
        }
    }
}

fn default_missing_credential() -> String {
    "Error: API key no configurada. Contacta al administrador.".to_string()
}

fn default_http_error() -> String {
    "Error al procesar tu mensaje. Código de error: {status}. Por favor, intenta de nuevo más tarde."
        .to_string()
}

fn default_empty_response() -> String {
    "No se recibió una respuesta válida del asistente. Por favor, intenta de nuevo más tarde."
        .to_string()
}

fn default_unexpected() -> String {
    "Ocurrió un error inesperado al procesar tu mensaje. Por favor, intenta de nuevo más tarde."
        .to_string()
}
