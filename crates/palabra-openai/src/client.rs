// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat-completions endpoints.
//!
//! Provides [`OpenAiClient`] which handles request construction and bearer
//! authentication. Every call is a single attempt: failures are reported to
//! the caller as they happen.

use std::time::Duration;

use palabra_core::PalabraError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse};

/// HTTP client for chat-completions communication.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// * `api_key` - Bearer token sent on every request
    /// * `base_url` - Full chat-completions endpoint URL
    /// * `timeout` - Per-request timeout; `None` waits indefinitely
    pub fn new(
        api_key: &str,
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, PalabraError> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| PalabraError::Config(format!("invalid API key header value: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| PalabraError::Provider {
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Returns the endpoint this client posts to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one completion request and returns the decoded response.
    ///
    /// A non-success status becomes [`PalabraError::ProviderStatus`];
    /// transport and decoding failures become [`PalabraError::Provider`].
    pub async fn create_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, PalabraError> {
        let response = self
            .client
            .post(&self.base_url)
            .json(request)
            .send()
            .await
            .map_err(|e| PalabraError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, "completion response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => warn!(
                    status = status.as_u16(),
                    error_type = api_err.error.type_.as_deref().unwrap_or("unknown"),
                    message = %api_err.error.message,
                    "completion service returned an error"
                ),
                Err(_) => warn!(
                    status = status.as_u16(),
                    body = %body,
                    "completion service returned an error"
                ),
            }
            return Err(PalabraError::ProviderStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| PalabraError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&body).map_err(|e| PalabraError::Provider {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palabra_core::Turn;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> OpenAiClient {
        OpenAiClient::new("gsk-test-key", base_url, None).unwrap()
    }

    fn test_request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "llama-3.3-70b-versatile".into(),
            messages: vec![Turn::system("Eres un asistente."), Turn::user("Hola")],
        }
    }

    #[tokio::test]
    async fn create_completion_success() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "model": "llama-3.3-70b-versatile",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "¡Hola! ¿En qué puedo ayudarte?"},
                "finish_reason": "stop"
            }]
        });

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.create_completion(&test_request()).await.unwrap();

        assert_eq!(result.id.as_deref(), Some("chatcmpl-test"));
        assert_eq!(result.first_content(), Some("¡Hola! ¿En qué puedo ayudarte?"));
    }

    #[tokio::test]
    async fn sends_bearer_auth_and_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("authorization", "Bearer gsk-test-key"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "model": "llama-3.3-70b-versatile",
                "messages": [
                    {"role": "system", "content": "Eres un asistente."},
                    {"role": "user", "content": "Hola"}
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.create_completion(&test_request()).await.unwrap();
        assert_eq!(result.first_content(), None);
    }

    #[tokio::test]
    async fn server_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.create_completion(&test_request()).await.unwrap_err();

        match err {
            PalabraError::ProviderStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream failure");
            }
            other => panic!("expected ProviderStatus, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn api_error_body_keeps_status() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({
            "error": {"message": "Invalid API Key", "type": "invalid_request_error"}
        });

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(&error_body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.create_completion(&test_request()).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn malformed_body_is_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.create_completion(&test_request()).await.unwrap_err();
        assert!(
            matches!(err, PalabraError::Provider { ref message, .. } if message.contains("parse")),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_provider_error() {
        // Port 9 (discard) on localhost is not expected to accept connections.
        let client = test_client("http://127.0.0.1:9/v1/chat/completions");
        let err = client.create_completion(&test_request()).await.unwrap_err();
        assert!(matches!(err, PalabraError::Provider { .. }), "got: {err:?}");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn rejects_api_key_with_newline() {
        let err = OpenAiClient::new("bad\nkey", "http://localhost", None).unwrap_err();
        assert!(matches!(err, PalabraError::Config(_)));
    }
}
