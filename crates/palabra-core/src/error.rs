// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Palabra chat assistant.

use thiserror::Error;

/// The primary error type used across adapter traits and the orchestrator.
#[derive(Debug, Error)]
pub enum PalabraError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Conversation log errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Completion service transport or decoding errors.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The completion service answered with a non-success HTTP status.
    #[error("provider returned status {status}: {body}")]
    ProviderStatus { status: u16, body: String },

    /// No API credential is configured for the completion service.
    #[error("completion service credential is not configured")]
    MissingCredential,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PalabraError {
    /// Returns the HTTP status for [`PalabraError::ProviderStatus`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            PalabraError::ProviderStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
