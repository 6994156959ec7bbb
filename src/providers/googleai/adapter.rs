use async_trait::async_trait;
use reqwest::Client;

use super::models::*;
use crate::providers::traits::ChatProvider;
use crate::providers::types::{
    ChatRequest, ContentPart, MessageContent, ProviderError, RequestMessage, RequestRole,
};
use crate::providers::ProviderId;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const KEY_PLACEHOLDER: &str = "your_google_ai_api_key_here";

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 12288;

/// Single-shot generate adapter: one POST per request with the API key as
/// a query parameter, reply concatenated from the first candidate's text
/// parts.
pub struct GoogleAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleAiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the endpoint base, used for testing against a local server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Config sanity check only: non-empty and not the sample placeholder.
    pub fn validate_api_key(api_key: &str) -> bool {
        !api_key.is_empty() && api_key != KEY_PLACEHOLDER
    }

    fn translate_role(role: RequestRole) -> &'static str {
        match role {
            RequestRole::Assistant => "model",
            _ => "user",
        }
    }

    /// Split a base64 data URL (`data:<mime>;base64,<payload>`) into its
    /// MIME type and payload. The original portal hardcoded `image/jpeg`
    /// here; the actual declared type is used instead, with jpeg as the
    /// fallback for bare payloads.
    fn parse_data_url(url: &str) -> Option<(String, String)> {
        let rest = url.strip_prefix("data:")?;
        let (mime, data) = rest.split_once(";base64,")?;
        let mime = if mime.is_empty() { "image/jpeg" } else { mime };
        Some((mime.to_string(), data.to_string()))
    }

    fn build_parts(content: &MessageContent) -> Vec<GeminiPart> {
        match content {
            MessageContent::Text(text) => vec![GeminiPart {
                text: Some(text.clone()),
                inline_data: None,
            }],
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(GeminiPart {
                        text: Some(text.clone()),
                        inline_data: None,
                    }),
                    ContentPart::ImageUrl { image_url } => {
                        let (mime_type, data) = Self::parse_data_url(&image_url.url)?;
                        Some(GeminiPart {
                            text: None,
                            inline_data: Some(GeminiInlineData { mime_type, data }),
                        })
                    }
                    ContentPart::Document { document } => Some(GeminiPart {
                        text: None,
                        inline_data: Some(GeminiInlineData {
                            mime_type: document.mime_type.clone(),
                            data: document.data.clone(),
                        }),
                    }),
                })
                .collect(),
        }
    }

    /// Translate the normalized message list into Gemini `contents`. The
    /// API has no system role, so system messages are dropped from the
    /// list and their text is prepended to the first remaining message's
    /// first text part.
    fn build_contents(messages: &[RequestMessage]) -> Vec<GeminiContent> {
        let mut contents: Vec<GeminiContent> = messages
            .iter()
            .filter(|msg| msg.role != RequestRole::System)
            .map(|msg| GeminiContent {
                role: Self::translate_role(msg.role).to_string(),
                parts: Self::build_parts(&msg.content),
            })
            .collect();

        let system_text = messages
            .iter()
            .find(|msg| msg.role == RequestRole::System)
            .and_then(|msg| msg.content.first_text())
            .map(str::to_string);

        if let Some(system_text) = system_text {
            if let Some(first_text) = contents
                .first_mut()
                .and_then(|c| c.parts.iter_mut().find(|p| p.text.is_some()))
            {
                let original = first_text.text.take().unwrap_or_default();
                first_text.text = Some(format!("{}\n\n{}", system_text, original));
            }
        }

        contents
    }

    fn parse_error_message(status: reqwest::StatusCode, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(msg) = parsed["error"]["message"].as_str() {
                return msg.to_string();
            }
        }
        format!("HTTP {}: Request failed", status.as_u16())
    }
}

#[async_trait]
impl ChatProvider for GoogleAiProvider {
    fn provider_id(&self) -> ProviderId {
        ProviderId::GoogleAi
    }

    async fn send_message(&self, request: ChatRequest) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::Configuration(
                "Google AI Studio API key is not configured".to_string(),
            ));
        }

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, request.model
        );

        let body = GeminiRequest {
            contents: Self::build_contents(&request.messages),
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                max_output_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
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

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if let Some(error) = gemini_response.error {
            return Err(ProviderError::RequestFailed(
                error.message.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        let text: String = gemini_response
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "No response content received".to_string(),
            ));
        }

        Ok(text)
    }
}
