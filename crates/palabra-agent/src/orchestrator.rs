// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation orchestrator: one submission, one completion call.
//!
//! A submission moves through `idle -> busy -> {replied | missing credential |
//! http error | empty response | unexpected} -> idle`. Every outcome ends with
//! exactly one assistant-authored message appended after the user's message,
//! except when no principal is signed in, which leaves the conversation
//! untouched.

use std::sync::Arc;

use palabra_config::PalabraConfig;
use palabra_core::{
    CompletionAdapter, CompletionRequest, Conversation, LogRecord, Message, PalabraError,
    PrincipalId, Turn,
};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::notices::Notices;
use crate::prompt::load_system_prompt;
use crate::writer::LogWriter;

/// Fixed per-process settings of an orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Completion model identifier.
    pub model: String,
    /// System instruction sent before every user turn.
    pub system_prompt: String,
    /// Conversation log collection records are appended to.
    pub collection: String,
    pub notices: Notices,
}

impl OrchestratorSettings {
    /// Build settings from configuration, resolving the system prompt.
    pub async fn from_config(config: &PalabraConfig) -> Self {
        let system_prompt = load_system_prompt(
            &config.agent.name,
            config.agent.system_prompt.as_deref(),
            config.agent.system_prompt_file.as_deref(),
        )
        .await;

        Self {
            model: config.completion.model.clone(),
            system_prompt,
            collection: config.log.collection.clone(),
            notices: Notices::from(&config.notices),
        }
    }
}

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The text was empty or whitespace; nothing happened.
    Blank,
    /// No principal is signed in; nothing happened.
    NoSession,
    /// The service answered with text, now the last message.
    Replied,
    /// No credential is configured; no request was sent.
    MissingCredential,
    /// The service answered with a non-success status.
    HttpError(u16),
    /// The service answered successfully but without text.
    EmptyResponse,
    /// Transport, decoding, or other failure.
    Unexpected,
}

/// Sets the busy flag for its lifetime.
struct BusyGuard {
    busy: Arc<watch::Sender<bool>>,
}

impl BusyGuard {
    fn engage(busy: &Arc<watch::Sender<bool>>) -> Self {
        busy.send_replace(true);
        Self {
            busy: Arc::clone(busy),
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.send_replace(false);
    }
}

/// Owns the displayed conversation and drives each submission.
///
/// `submit` takes `&mut self`, so submissions on one orchestrator never
/// interleave. The busy flag is published for presentation layers.
pub struct Orchestrator {
    settings: OrchestratorSettings,
    session: watch::Receiver<Option<PrincipalId>>,
    completion: Arc<dyn CompletionAdapter>,
    log_writer: LogWriter,
    conversation: Conversation,
    busy: Arc<watch::Sender<bool>>,
}

impl Orchestrator {
    pub fn new(
        settings: OrchestratorSettings,
        session: watch::Receiver<Option<PrincipalId>>,
        completion: Arc<dyn CompletionAdapter>,
        log_writer: LogWriter,
    ) -> Self {
        let (busy, _rx) = watch::channel(false);
        Self {
            settings,
            session,
            completion,
            log_writer,
            conversation: Conversation::new(),
            busy: Arc::new(busy),
        }
    }

    /// Messages in display order.
    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.borrow()
    }

    /// Subscribe to busy-flag changes.
    pub fn subscribe_busy(&self) -> watch::Receiver<bool> {
        self.busy.subscribe()
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn log_writer(&self) -> &LogWriter {
        &self.log_writer
    }

    /// Submit one user message and wait for the turn to settle.
    ///
    /// Never fails: every error becomes an assistant notice in the
    /// conversation, reported through the returned [`SubmitOutcome`].
    pub async fn submit(&mut self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Blank;
        }

        let Some(principal) = self.session.borrow().clone() else {
            error!("no principal signed in; message not processed");
            return SubmitOutcome::NoSession;
        };

        let _busy = BusyGuard::engage(&self.busy);

        let user_message = Message::user(text);
        self.log_writer.enqueue(
            &self.settings.collection,
            LogRecord::from_message(&principal, &user_message),
        );
        self.conversation.push(user_message);

        if !self.completion.has_credential() {
            warn!("completion credential is not configured");
            let notice = self.settings.notices.missing_credential().to_string();
            self.conversation.push(Message::assistant(notice));
            return SubmitOutcome::MissingCredential;
        }

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            turns: vec![
                Turn::system(self.settings.system_prompt.as_str()),
                Turn::user(text),
            ],
        };
        debug!(model = request.model.as_str(), "sending completion request");

        let (notice, outcome) = match self.completion.complete(request).await {
            Ok(response) => match response.content.filter(|content| !content.is_empty()) {
                Some(content) => {
                    let reply = Message::assistant(content);
                    self.log_writer.enqueue(
                        &self.settings.collection,
                        LogRecord::from_message(&principal, &reply),
                    );
                    self.conversation.push(reply);
                    info!(principal = %principal, "assistant replied");
                    return SubmitOutcome::Replied;
                }
                None => {
                    warn!(response_id = ?response.id, "completion response carried no text");
                    (
                        self.settings.notices.empty_response().to_string(),
                        SubmitOutcome::EmptyResponse,
                    )
                }
            },
            Err(PalabraError::ProviderStatus { status, .. }) => {
                warn!(status, "completion service returned a non-success status");
                (
                    self.settings.notices.http_error(status),
                    SubmitOutcome::HttpError(status),
                )
            }
            Err(PalabraError::MissingCredential) => {
                warn!("completion credential rejected before sending");
                (
                    self.settings.notices.missing_credential().to_string(),
                    SubmitOutcome::MissingCredential,
                )
            }
            Err(e) => {
                error!(error = %e, "completion request failed");
                (
                    self.settings.notices.unexpected().to_string(),
                    SubmitOutcome::Unexpected,
                )
            }
        };

        self.conversation.push(Message::assistant(notice));
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use palabra_core::Role;
    use palabra_test_utils::{MockCompletion, MockLog};

    struct Fixture {
        orchestrator: Orchestrator,
        completion: Arc<MockCompletion>,
        log: Arc<MockLog>,
        session: SessionStore,
    }

    fn settings() -> OrchestratorSettings {
        OrchestratorSettings {
            model: "test-model".into(),
            system_prompt: "Eres un asistente.".into(),
            collection: "chat-messages".into(),
            notices: Notices::default(),
        }
    }

    fn fixture(completion: MockCompletion) -> Fixture {
        let completion = Arc::new(completion);
        let log = Arc::new(MockLog::new());
        let session = SessionStore::signed_in(PrincipalId("uid-1".into()));
        let orchestrator = Orchestrator::new(
            settings(),
            session.subscribe(),
            completion.clone(),
            LogWriter::spawn(log.clone()),
        );
        Fixture {
            orchestrator,
            completion,
            log,
            session,
        }
    }

    #[tokio::test]
    async fn reply_is_appended_and_logged() {
        let mut f = fixture(MockCompletion::new());
        f.completion.push_reply("Respuesta X");

        let outcome = f.orchestrator.submit("Hola").await;
        assert_eq!(outcome, SubmitOutcome::Replied);

        let messages = f.orchestrator.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::user("Hola"));
        assert_eq!(messages[1], Message::assistant("Respuesta X"));

        f.orchestrator.log_writer().flush().await;
        let appended = f.log.appended();
        assert_eq!(appended.len(), 2);
        assert_eq!(appended[0].1.role, Role::User);
        assert_eq!(appended[1].1.role, Role::Assistant);
        assert_eq!(appended[1].1.principal_id.as_str(), "uid-1");
    }

    #[tokio::test]
    async fn request_carries_system_prompt_then_user_text_only() {
        let mut f = fixture(MockCompletion::new());
        f.completion.push_reply("uno");
        f.completion.push_reply("dos");

        f.orchestrator.submit("primera").await;
        f.orchestrator.submit("segunda").await;

        let requests = f.completion.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].model, "test-model");
        assert_eq!(
            requests[1].turns,
            vec![Turn::system("Eres un asistente."), Turn::user("segunda")]
        );
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn no_principal_is_a_noop() {
        let mut f = fixture(MockCompletion::new());
        f.session.sign_out();

        let outcome = f.orchestrator.submit("Hola").await;

        assert_eq!(outcome, SubmitOutcome::NoSession);
        assert!(f.orchestrator.messages().is_empty());
        assert_eq!(f.completion.call_count(), 0);
        assert!(!f.orchestrator.is_busy());
        assert!(logs_contain("no principal signed in"));
    }

    #[tokio::test]
    async fn blank_text_is_ignored() {
        let mut f = fixture(MockCompletion::new());
        assert_eq!(f.orchestrator.submit("   \n").await, SubmitOutcome::Blank);
        assert!(f.orchestrator.messages().is_empty());
        assert_eq!(f.completion.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_credential_skips_the_request() {
        let mut f = fixture(MockCompletion::new().without_credential());

        let outcome = f.orchestrator.submit("Hola").await;

        assert_eq!(outcome, SubmitOutcome::MissingCredential);
        assert_eq!(f.completion.call_count(), 0);
        let messages = f.orchestrator.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[1].content(),
            "Error: API key no configurada. Contacta al administrador."
        );
    }

    #[tokio::test]
    async fn http_error_shows_status_and_logs_only_user_record() {
        let mut f = fixture(MockCompletion::new());
        f.completion.push_status(500, "boom");

        let outcome = f.orchestrator.submit("Hola").await;
        assert_eq!(outcome, SubmitOutcome::HttpError(500));

        let messages = f.orchestrator.messages();
        assert_eq!(messages[1].role(), Role::Assistant);
        assert!(messages[1].content().contains("500"));

        f.orchestrator.log_writer().flush().await;
        let appended = f.log.appended();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].1.content, "Hola");
    }

    #[tokio::test]
    async fn empty_content_is_treated_as_no_response() {
        let mut f = fixture(MockCompletion::new());
        f.completion.push_empty();
        f.completion.push_reply("");

        assert_eq!(f.orchestrator.submit("a").await, SubmitOutcome::EmptyResponse);
        assert_eq!(f.orchestrator.submit("b").await, SubmitOutcome::EmptyResponse);

        let messages = f.orchestrator.messages();
        assert_eq!(messages.len(), 4);
        assert!(messages[3].content().starts_with("No se recibió"));
    }

    #[tokio::test]
    async fn transport_failure_is_unexpected() {
        let mut f = fixture(MockCompletion::new());
        f.completion.push_error("connection reset");

        assert_eq!(f.orchestrator.submit("Hola").await, SubmitOutcome::Unexpected);
        assert!(
            f.orchestrator.messages()[1]
                .content()
                .starts_with("Ocurrió un error inesperado")
        );
    }

    #[tokio::test]
    async fn busy_flag_is_cleared_on_every_path() {
        let mut f = fixture(MockCompletion::new());
        let busy = f.orchestrator.subscribe_busy();

        f.completion.push_reply("ok");
        f.completion.push_status(503, "");
        f.completion.push_empty();
        f.completion.push_error("boom");

        for _ in 0..4 {
            f.orchestrator.submit("x").await;
            assert!(!f.orchestrator.is_busy());
            assert!(!*busy.borrow());
        }
    }

    #[tokio::test]
    async fn log_failure_does_not_change_conversation() {
        let mut f = fixture(MockCompletion::new());
        f.log.set_failing(true);
        f.completion.push_reply("Respuesta");

        assert_eq!(f.orchestrator.submit("Hola").await, SubmitOutcome::Replied);
        f.orchestrator.log_writer().flush().await;

        assert_eq!(f.orchestrator.messages().len(), 2);
        assert!(f.log.appended().is_empty());
        assert_eq!(f.log.attempts(), 2);
    }
}
