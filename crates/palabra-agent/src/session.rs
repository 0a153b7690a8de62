// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session store: publishes the signed-in principal to subscribers.
//!
//! Identity verification is out of scope; whoever drives the store (the shell's
//! `/login` command, the `session.principal` config key) is trusted.

use palabra_core::PrincipalId;
use tokio::sync::watch;
use tracing::info;

/// Holds the current principal and notifies subscribers when it changes.
///
/// Dropping a [`watch::Receiver`] returned by [`subscribe`](Self::subscribe)
/// unsubscribes it.
#[derive(Debug)]
pub struct SessionStore {
    tx: watch::Sender<Option<PrincipalId>>,
}

impl SessionStore {
    /// Create a store with no principal signed in.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Create a store with `principal` already signed in.
    pub fn signed_in(principal: PrincipalId) -> Self {
        let (tx, _rx) = watch::channel(Some(principal));
        Self { tx }
    }

    /// Sign `principal` in, replacing any previous principal.
    pub fn sign_in(&self, principal: PrincipalId) {
        info!(principal = %principal, "principal signed in");
        self.tx.send_replace(Some(principal));
    }

    /// Sign the current principal out. No-op when nobody is signed in.
    pub fn sign_out(&self) {
        if let Some(previous) = self.tx.send_replace(None) {
            info!(principal = %previous, "principal signed out");
        }
    }

    /// The currently signed-in principal, if any.
    pub fn current(&self) -> Option<PrincipalId> {
        self.tx.borrow().clone()
    }

    /// Subscribe to principal changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<PrincipalId>> {
        self.tx.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
