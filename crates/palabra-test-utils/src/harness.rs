// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end conversation testing.
//!
//! `TestHarness` assembles an orchestrator over a mock completion service,
//! a temp SQLite conversation log, and a session store.

use std::sync::Arc;

use palabra_agent::{
    LogWriter, Notices, Orchestrator, OrchestratorSettings, SessionStore, SubmitOutcome,
};
use palabra_config::model::LogConfig;
use palabra_core::{ConversationLog, Message, PalabraError, PrincipalId, StoredRecord};
use palabra_storage::SqliteLog;

use crate::mock_completion::MockCompletion;

/// Principal signed in by default.
pub const TEST_PRINCIPAL: &str = "test-user";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    completion: MockCompletion,
    system_prompt: String,
    principal: Option<PrincipalId>,
    notices: Notices,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            completion: MockCompletion::new(),
            system_prompt: "You are a test assistant.".to_string(),
            principal: Some(PrincipalId(TEST_PRINCIPAL.to_string())),
            notices: Notices::default(),
        }
    }

    /// Queue text replies on the mock completion service.
    pub fn with_replies<I, S>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for reply in replies {
            self.completion.push_reply(reply);
        }
        self
    }

    /// Use a preconfigured mock completion service.
    pub fn with_completion(mut self, completion: MockCompletion) -> Self {
        self.completion = completion;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_notices(mut self, notices: Notices) -> Self {
        self.notices = notices;
        self
    }

    /// Start with nobody signed in.
    pub fn signed_out(mut self) -> Self {
        self.principal = None;
        self
    }

    /// Build the harness, creating a temp SQLite log.
    pub async fn build(self) -> Result<TestHarness, PalabraError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| PalabraError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let log_config = LogConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            ..LogConfig::default()
        };
        let collection = log_config.collection.clone();
        let log = SqliteLog::new(log_config);
        log.initialize().await?;
        let log: Arc<dyn ConversationLog> = Arc::new(log);

        let session = match self.principal {
            Some(principal) => SessionStore::signed_in(principal),
            None => SessionStore::new(),
        };

        let completion = Arc::new(self.completion);
        let settings = OrchestratorSettings {
            model: "mock-model".to_string(),
            system_prompt: self.system_prompt,
            collection,
            notices: self.notices,
        };
        let orchestrator = Orchestrator::new(
            settings,
            session.subscribe(),
            completion.clone(),
            LogWriter::spawn(log.clone()),
        );

        Ok(TestHarness {
            completion,
            log,
            session,
            orchestrator,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock completion service and temp storage.
pub struct TestHarness {
    /// The mock completion service.
    pub completion: Arc<MockCompletion>,
    /// SQLite conversation log (temp DB, cleaned up on drop).
    pub log: Arc<dyn ConversationLog>,
    pub session: SessionStore,
    pub orchestrator: Orchestrator,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Submit one message through the orchestrator.
    pub async fn submit(&mut self, text: &str) -> SubmitOutcome {
        self.orchestrator.submit(text).await
    }

    pub fn messages(&self) -> &[Message] {
        self.orchestrator.messages()
    }

    /// Wait for pending log writes, then read the whole log collection.
    pub async fn logged_records(&self) -> Result<Vec<StoredRecord>, PalabraError> {
        self.orchestrator.log_writer().flush().await;
        let collection = &self.orchestrator.settings().collection;
        self.log.records(collection, None, None).await
    }
}
