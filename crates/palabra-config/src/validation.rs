// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express: non-empty
//! identifiers, an http(s) endpoint, a positive timeout, and a usable HTTP
//! error template.

use crate::diagnostic::ConfigError;
use crate::model::PalabraConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every violation instead of failing fast.
pub fn validate_config(config: &PalabraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.agent.name.trim().is_empty() {
        fail("agent.name must not be empty".to_string());
    }

    let level = config.agent.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "agent.log_level `{}` is not one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if let Some(principal) = &config.session.principal
        && principal.trim().is_empty()
    {
        fail("session.principal must not be empty when set".to_string());
    }

    let base_url = config.completion.base_url.trim();
    if base_url.is_empty() {
        fail("completion.base_url must not be empty".to_string());
    } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        fail(format!(
            "completion.base_url `{base_url}` must start with http:// or https://"
        ));
    }

    if config.completion.model.trim().is_empty() {
        fail("completion.model must not be empty".to_string());
    }

    if config.completion.timeout_secs == Some(0) {
        fail("completion.timeout_secs must be greater than 0 when set".to_string());
    }

    if config.log.database_path.trim().is_empty() {
        fail("log.database_path must not be empty".to_string());
    }

    if config.log.collection.trim().is_empty() {
        fail("log.collection must not be empty".to_string());
    }

    if !config.notices.http_error.contains("{status}") {
        fail("notices.http_error must contain the `{status}` placeholder".to_string());
    }

    for (key, text) in [
        ("missing_credential", &config.notices.missing_credential),
        ("empty_response", &config.notices.empty_response),
        ("unexpected", &config.notices.unexpected),
    ] {
        if text.trim().is_empty() {
            fail(format!("notices.{key} must not be empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
