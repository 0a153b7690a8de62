// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Palabra chat assistant.
//!
//! This crate provides the error type, domain types, and adapter traits that
//! the orchestrator and every external collaborator (completion service,
//! conversation log) share.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PalabraError;
pub use types::{
    AdapterType, CompletionRequest, CompletionResponse, Conversation, HealthStatus, LogRecord,
    Message, PrincipalId, Role, StoredRecord, Turn, TurnRole,
};

pub use traits::{CompletionAdapter, ConversationLog, PluginAdapter};
