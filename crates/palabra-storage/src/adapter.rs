// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ConversationLog trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use palabra_config::model::LogConfig;
use palabra_core::{
    AdapterType, ConversationLog, HealthStatus, LogRecord, PalabraError, PluginAdapter,
    PrincipalId, StoredRecord,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed conversation log.
///
/// The database is lazily opened on the first call to
/// [`ConversationLog::initialize`].
pub struct SqliteLog {
    config: LogConfig,
    db: OnceCell<Database>,
}

impl SqliteLog {
    /// Create a new log for the given configuration without opening it.
    pub fn new(config: LogConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, PalabraError> {
        self.db.get().ok_or_else(|| PalabraError::Storage {
            source: "conversation log not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteLog {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ConversationLog
    }

    async fn health_check(&self) -> Result<HealthStatus, PalabraError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PalabraError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationLog for SqliteLog {
    async fn initialize(&self) -> Result<(), PalabraError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| PalabraError::Storage {
            source: "conversation log already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite conversation log initialized");
        Ok(())
    }

    async fn append(&self, collection: &str, record: &LogRecord) -> Result<(), PalabraError> {
        let id = queries::records::insert_record(self.db()?, collection, record).await?;
        debug!(id = %id, collection, role = %record.role, "log record appended");
        Ok(())
    }

    async fn records(
        &self,
        collection: &str,
        principal: Option<&PrincipalId>,
        limit: Option<i64>,
    ) -> Result<Vec<StoredRecord>, PalabraError> {
        queries::records::list_records(self.db()?, collection, principal, limit).await
    }
}
