// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation log adapter trait for durable audit storage.

use async_trait::async_trait;

use crate::error::PalabraError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{LogRecord, PrincipalId, StoredRecord};

/// Append-only sink recording every message of every conversation.
///
/// The orchestrator only ever calls [`append`](ConversationLog::append).
/// [`records`](ConversationLog::records) exists for audit tooling.
#[async_trait]
pub trait ConversationLog: PluginAdapter {
    /// Prepares the backend (migrations, connections).
    async fn initialize(&self) -> Result<(), PalabraError>;

    /// Appends one record to `collection`. The store assigns the timestamp.
    async fn append(&self, collection: &str, record: &LogRecord) -> Result<(), PalabraError>;

    /// Lists stored records of `collection` in insertion order, optionally
    /// filtered by principal.
    async fn records(
        &self,
        collection: &str,
        principal: Option<&PrincipalId>,
        limit: Option<i64>,
    ) -> Result<Vec<StoredRecord>, PalabraError>;
}
