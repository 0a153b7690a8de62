// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation log with a failure switch.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use palabra_core::{
    AdapterType, ConversationLog, HealthStatus, LogRecord, PalabraError, PluginAdapter,
    PrincipalId, StoredRecord,
};

/// Records every successful append as `(collection, record)`.
///
/// While failing, appends are counted as attempts but rejected.
pub struct MockLog {
    appended: Mutex<Vec<(String, LogRecord)>>,
    attempts: AtomicUsize,
    failing: AtomicBool,
}

impl MockLog {
    pub fn new() -> Self {
        Self {
            appended: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Make subsequent appends fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Successfully appended records, in order.
    pub fn appended(&self) -> Vec<(String, LogRecord)> {
        self.appended
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of append calls, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for MockLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockLog {
    fn name(&self) -> &str {
        "mock-log"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ConversationLog
    }

    async fn health_check(&self) -> Result<HealthStatus, PalabraError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PalabraError> {
        Ok(())
    }
}

#[async_trait]
impl ConversationLog for MockLog {
    async fn initialize(&self) -> Result<(), PalabraError> {
        Ok(())
    }

    async fn append(&self, collection: &str, record: &LogRecord) -> Result<(), PalabraError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(PalabraError::Storage {
                source: "mock log rejected the write".into(),
            });
        }
        self.appended
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((collection.to_string(), record.clone()));
        Ok(())
    }

    async fn records(
        &self,
        collection: &str,
        principal: Option<&PrincipalId>,
        limit: Option<i64>,
    ) -> Result<Vec<StoredRecord>, PalabraError> {
        let matching: Vec<StoredRecord> = self
            .appended()
            .into_iter()
            .enumerate()
            .filter(|(_, (c, r))| c == collection && principal.is_none_or(|p| *p == r.principal_id))
            .map(|(i, (c, r))| StoredRecord {
                id: format!("mock-{i}"),
                collection: c,
                principal_id: r.principal_id,
                role: r.role,
                content: r.content,
                created_at: "1970-01-01T00:00:00.000Z".to_string(),
            })
            .collect();

        let skip = match limit {
            Some(n) if n >= 0 => matching.len().saturating_sub(n as usize),
            _ => 0,
        };
        Ok(matching.into_iter().skip(skip).collect())
    }
}
