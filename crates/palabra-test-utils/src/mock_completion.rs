// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion adapter for deterministic testing.
//!
//! `MockCompletion` implements `CompletionAdapter` with scripted outcomes,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use palabra_core::{
    AdapterType, CompletionAdapter, CompletionRequest, CompletionResponse, HealthStatus,
    PalabraError, PluginAdapter,
};

/// One scripted result of a `complete` call.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Success with this text as the first choice.
    Reply(String),
    /// Success without any text.
    Empty,
    /// Non-success HTTP status.
    Status { status: u16, body: String },
    /// Transport or decoding failure.
    Error(String),
}

/// A mock completion service that replays scripted outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" reply is returned.
pub struct MockCompletion {
    credential: AtomicBool,
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl MockCompletion {
    /// Create a mock with a credential and an empty script.
    pub fn new() -> Self {
        Self {
            credential: AtomicBool::new(true),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Create a mock pre-loaded with text replies.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for reply in replies {
            mock.push_reply(reply);
        }
        mock
    }

    /// Report no credential configured.
    pub fn without_credential(self) -> Self {
        self.credential.store(false, Ordering::SeqCst);
        self
    }

    /// Hold every call until `gate` is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn set_credential(&self, present: bool) {
        self.credential.store(present, Ordering::SeqCst);
    }

    pub fn push(&self, outcome: Scripted) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    pub fn push_reply(&self, text: impl Into<String>) {
        self.push(Scripted::Reply(text.into()));
    }

    pub fn push_empty(&self) {
        self.push(Scripted::Empty);
    }

    pub fn push_status(&self, status: u16, body: impl Into<String>) {
        self.push(Scripted::Status {
            status,
            body: body.into(),
        });
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.push(Scripted::Error(message.into()));
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `complete` calls, counted when the call starts.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> Scripted {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Scripted::Reply("mock response".to_string()))
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockCompletion {
    fn name(&self) -> &str {
        "mock-completion"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, PalabraError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PalabraError> {
        Ok(())
    }
}

#[async_trait]
impl CompletionAdapter for MockCompletion {
    fn has_credential(&self) -> bool {
        self.credential.load(Ordering::SeqCst)
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, PalabraError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let model = request.model.clone();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let content = match self.next_outcome() {
            Scripted::Reply(text) => Some(text),
            Scripted::Empty => None,
            Scripted::Status { status, body } => {
                return Err(PalabraError::ProviderStatus { status, body });
            }
            Scripted::Error(message) => {
                return Err(PalabraError::Provider {
                    message,
                    source: None,
                });
            }
        };

        Ok(CompletionResponse {
            id: Some(format!("mock-{}", self.call_count())),
            model: Some(model),
            content,
        })
    }
}
