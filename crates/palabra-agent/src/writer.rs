// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Detached, best-effort conversation log writer.
//!
//! Records are appended by one background task in the order they were
//! enqueued, so a turn's user record always lands before its assistant
//! record. Append failures are logged and dropped; callers never see them.

use std::sync::Arc;

use palabra_core::{ConversationLog, LogRecord};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

enum Command {
    Append { collection: String, record: LogRecord },
    Flush(oneshot::Sender<()>),
    Close(oneshot::Sender<()>),
}

/// Handle to the background writer task. Cheap to clone.
#[derive(Clone)]
pub struct LogWriter {
    tx: mpsc::UnboundedSender<Command>,
}

impl LogWriter {
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn(log: Arc<dyn ConversationLog>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(log, rx));
        Self { tx }
    }

    /// Queue `record` for appending to `collection`. Never blocks or fails.
    pub fn enqueue(&self, collection: &str, record: LogRecord) {
        let command = Command::Append {
            collection: collection.to_string(),
            record,
        };
        if self.tx.send(command).is_err() {
            warn!(collection, "log writer is closed; record dropped");
        }
    }

    /// Wait until every record enqueued so far has been attempted.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Drain pending records and stop the writer task.
    ///
    /// Records enqueued after this call are dropped.
    pub async fn close(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Close(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn run(log: Arc<dyn ConversationLog>, mut rx: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Append { collection, record } => {
                append(log.as_ref(), &collection, &record).await
            }
            Command::Flush(done) => {
                let _ = done.send(());
            }
            Command::Close(done) => {
                rx.close();
                // Anything queued before close() still gets written.
                while let Some(pending) = rx.recv().await {
                    match pending {
                        Command::Append { collection, record } => {
                            append(log.as_ref(), &collection, &record).await
                        }
                        Command::Flush(waiter) | Command::Close(waiter) => {
                            let _ = waiter.send(());
                        }
                    }
                }
                debug!("log writer closed");
                let _ = done.send(());
                return;
            }
        }
    }
    debug!("log writer stopped: all handles dropped");
}

async fn append(log: &dyn ConversationLog, collection: &str, record: &LogRecord) {
    if let Err(e) = log.append(collection, record).await {
        warn!(
            collection,
            role = %record.role,
            error = %e,
            "failed to persist log record"
        );
    }
}
