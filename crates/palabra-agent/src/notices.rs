// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant-authored placeholder texts shown when a turn fails.

use palabra_config::model::NoticesConfig;

/// Placeholder used in the HTTP error template.
const STATUS_PLACEHOLDER: &str = "{status}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notices {
    missing_credential: String,
    http_error: String,
    empty_response: String,
    unexpected: String,
}

impl Notices {
    pub fn missing_credential(&self) -> &str {
        &self.missing_credential
    }

    /// Renders the HTTP error template with `status` interpolated.
    pub fn http_error(&self, status: u16) -> String {
        self.http_error
            .replace(STATUS_PLACEHOLDER, &status.to_string())
    }

    pub fn empty_response(&self) -> &str {
        &self.empty_response
    }

    pub fn unexpected(&self) -> &str {
        &self.unexpected
    }
}

impl From<&NoticesConfig> for Notices {
    fn from(config: &NoticesConfig) -> Self {
        Self {
            missing_credential: config.missing_credential.clone(),
            http_error: config.http_error.clone(),
            empty_response: config.empty_response.clone(),
            unexpected: config.unexpected.clone(),
        }
    }
}

impl Default for Notices {
    fn default() -> Self {
        Self::from(&NoticesConfig::default())
    }
}
