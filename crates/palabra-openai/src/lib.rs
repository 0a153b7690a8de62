// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible completion adapter for the Palabra chat assistant.
//!
//! This crate implements [`CompletionAdapter`] for any endpoint speaking the
//! chat-completions protocol (Groq by default). It sends one request per
//! call and never retries.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use palabra_config::model::CompletionConfig;
use palabra_core::{
    AdapterType, CompletionAdapter, CompletionRequest, CompletionResponse, HealthStatus,
    PalabraError, PluginAdapter,
};
use tracing::{debug, info, warn};

use crate::client::OpenAiClient;
use crate::types::ChatCompletionRequest;

/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Chat-completions provider implementing [`CompletionAdapter`].
///
/// API key resolution order: config (including `PALABRA_COMPLETION_API_KEY`)
/// -> `GROQ_API_KEY` env var -> none. A missing key is not a construction
/// error: the provider reports it through [`CompletionAdapter::has_credential`]
/// so the conversation can show a notice instead of crashing.
pub struct OpenAiProvider {
    client: Option<OpenAiClient>,
}

impl OpenAiProvider {
    /// Creates a provider from the `[completion]` configuration section.
    pub fn new(config: &CompletionConfig) -> Result<Self, PalabraError> {
        let api_key = resolve_api_key(config.api_key.as_deref(), |name| std::env::var(name).ok());
        let timeout = config.timeout_secs.map(Duration::from_secs);

        let client = match api_key {
            Some(key) => {
                info!(
                    base_url = config.base_url,
                    model = config.model,
                    "completion provider initialized"
                );
                Some(OpenAiClient::new(&key, config.base_url.clone(), timeout)?)
            }
            None => {
                warn!("no completion API key configured; messages will not be answered");
                None
            }
        };

        Ok(Self { client })
    }

    /// Creates a provider around an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: Option<OpenAiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, PalabraError> {
        // No network probe: a probe would spend quota.
        Ok(match self.client {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Degraded("no API key configured".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), PalabraError> {
        debug!("completion provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl CompletionAdapter for OpenAiProvider {
    fn has_credential(&self) -> bool {
        self.client.is_some()
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, PalabraError> {
        let client = self.client.as_ref().ok_or(PalabraError::MissingCredential)?;

        let body = ChatCompletionRequest {
            model: request.model,
            messages: request.turns,
        };
        let response = client.create_completion(&body).await?;

        Ok(CompletionResponse {
            content: response.first_content().map(str::to_string),
            id: response.id,
            model: response.model,
        })
    }
}

/// Resolves the API key from config, then from [`API_KEY_ENV`].
///
/// Empty strings count as unset.
fn resolve_api_key(
    config_key: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Some(key.to_string());
    }

    env(API_KEY_ENV).filter(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use palabra_core::Turn;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "llama-3.3-70b-versatile".into(),
            turns: vec![Turn::system("persona"), Turn::user("Hola")],
        }
    }

    #[test]
    fn resolve_api_key_from_config() {
        assert_eq!(
            resolve_api_key(Some("gsk-config"), |_| Some("gsk-env".into())),
            Some("gsk-config".into())
        );
    }

    #[test]
    fn resolve_api_key_empty_config_falls_back_to_env() {
        let key = resolve_api_key(Some(""), |name| {
            (name == API_KEY_ENV).then(|| "gsk-env".to_string())
        });
        assert_eq!(key, Some("gsk-env".into()));
    }

    #[test]
    fn resolve_api_key_none_when_nothing_set() {
        assert_eq!(resolve_api_key(None, no_env), None);
        assert_eq!(resolve_api_key(None, |_| Some(String::new())), None);
    }

    #[tokio::test]
    async fn missing_key_reports_no_credential() {
        let provider = OpenAiProvider::with_client(None);
        assert!(!provider.has_credential());

        let err = provider.complete(request()).await.unwrap_err();
        assert!(matches!(err, PalabraError::MissingCredential));

        let health = provider.health_check().await.unwrap();
        assert!(matches!(health, HealthStatus::Degraded(_)));
    }

    #[tokio::test]
    async fn complete_maps_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-9",
                "model": "llama-3.3-70b-versatile",
                "choices": [{"message": {"role": "assistant", "content": "Respuesta X"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::new("gsk-test", server.uri(), None).unwrap();
        let provider = OpenAiProvider::with_client(Some(client));
        assert!(provider.has_credential());

        let response = provider.complete(request()).await.unwrap();
        assert_eq!(response.content.as_deref(), Some("Respuesta X"));
        assert_eq!(response.id.as_deref(), Some("chatcmpl-9"));
    }

    #[tokio::test]
    async fn complete_with_empty_choices_has_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("gsk-test", server.uri(), None).unwrap();
        let provider = OpenAiProvider::with_client(Some(client));

        let response = provider.complete(request()).await.unwrap();
        assert_eq!(response.content, None);
    }

    #[test]
    fn new_from_config_with_key() {
        let config = CompletionConfig {
            api_key: Some("gsk-config".into()),
            ..CompletionConfig::default()
        };
        let provider = OpenAiProvider::new(&config).unwrap();
        assert!(provider.has_credential());
    }

    #[test]
    fn plugin_adapter_metadata() {
        let provider = OpenAiProvider::with_client(None);
        assert_eq!(provider.name(), "openai-compatible");
        assert_eq!(provider.version(), semver::Version::new(0, 1, 0));
        assert_eq!(provider.adapter_type(), AdapterType::Completion);
    }
}
