// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion service adapter trait (hosted chat-completion APIs).

use async_trait::async_trait;

use crate::error::PalabraError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CompletionRequest, CompletionResponse};

/// Adapter for a stateless request/response completion API.
///
/// Implementations make exactly one attempt per call. A non-success HTTP
/// status must be reported as [`PalabraError::ProviderStatus`] so callers can
/// surface the status code.
#[async_trait]
pub trait CompletionAdapter: PluginAdapter {
    /// Whether an API credential is configured.
    fn has_credential(&self) -> bool;

    /// Sends a completion request and returns the parsed response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, PalabraError>;
}
