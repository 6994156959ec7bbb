use async_trait::async_trait;
use reqwest::Client;

use super::models::{ErrorResponse, OpenRouterRequest};
use super::stream::collect_stream;
use crate::providers::traits::ChatProvider;
use crate::providers::types::{ChatRequest, ProviderError};
use crate::providers::ProviderId;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const KEY_PLACEHOLDER: &str = "your_openrouter_api_key_here";

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Streaming completions adapter: one POST with bearer auth, reply
/// assembled from incremental SSE deltas.
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    api_url: String,
}

impl OpenRouterProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_url: OPENROUTER_API_URL.to_string(),
        }
    }

    /// Override the completions endpoint, used for testing against a
    /// local server.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Config sanity check only: non-empty and not the sample placeholder.
    pub fn validate_api_key(api_key: &str) -> bool {
        !api_key.is_empty() && api_key != KEY_PLACEHOLDER
    }

    fn parse_error_message(status: reqwest::StatusCode, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
            if let Some(msg) = parsed.error.and_then(|e| e.message) {
                return msg;
            }
        }
        format!("HTTP {}: Request failed", status.as_u16())
    }
}

#[async_trait]
impl ChatProvider for OpenRouterProvider {
    fn provider_id(&self) -> ProviderId {
        ProviderId::OpenRouter
    }

    async fn send_message(&self, request: ChatRequest) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::Configuration(
                "OpenRouter API key is not configured".to_string(),
            ));
        }

        let body = OpenRouterRequest {
            model: request.model,
            messages: request.messages,
            stream: true,
            temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", "https://anusarth.app")
            .header("X-Title", "Anusarth Chat")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::RequestFailed(Self::parse_error_message(
                status, &body,
            )));
        }

        collect_stream(response).await
    }
}
