use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All adapter failures collapse to one human-readable message for the
/// caller; the adapters never retry.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0}")]
    Configuration(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestRole {
    System,
    User,
    Assistant,
}

/// One typed part of a multi-part message. This closed set is the whole
/// vocabulary the adapters translate from; provider wire shapes never
/// leak past them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
    Document { document: DocumentData },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    /// A base64 data URL (`data:image/...;base64,...`).
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentData {
    pub name: String,
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// The first text in the content, used where a provider needs a plain
    /// string (title prompts, system-prompt merging).
    pub fn first_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            MessageContent::Parts(parts) => parts.iter().find_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMessage {
    pub role: RequestRole,
    pub content: MessageContent,
}

impl RequestMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: RequestRole::System,
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn text(role: RequestRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn parts(role: RequestRole, parts: Vec<ContentPart>) -> Self {
        Self {
            role,
            content: MessageContent::Parts(parts),
        }
    }
}

/// The normalized chat call: system prompt and history as ordered
/// messages, plus generation parameters. Adapters apply their own
/// defaults when `temperature`/`max_tokens` are unset.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<RequestMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_serializes_as_plain_string() {
        let msg = RequestMessage::text(RequestRole::User, "hello");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);
    }

    #[test]
    fn test_parts_content_serializes_tagged() {
        let msg = RequestMessage::parts(
            RequestRole::User,
            vec![
                ContentPart::Text {
                    text: "what is this?".to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: "data:image/png;base64,AAAA".to_string(),
                    },
                },
            ],
        );
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"text""#));
        assert!(json.contains(r#""type":"image_url""#));
        assert!(json.contains(r#""url":"data:image/png;base64,AAAA""#));
    }

    #[test]
    fn test_first_text() {
        let plain = MessageContent::Text("a".to_string());
        assert_eq!(plain.first_text(), Some("a"));

        let parts = MessageContent::Parts(vec![
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: "data:image/png;base64,AAAA".to_string(),
                },
            },
            ContentPart::Text {
                text: "caption".to_string(),
            },
        ]);
        assert_eq!(parts.first_text(), Some("caption"));

        let empty = MessageContent::Parts(Vec::new());
        assert_eq!(empty.first_text(), None);
    }

    #[test]
    fn test_provider_error_messages_are_single_line() {
        let err = ProviderError::Configuration("OpenRouter API key is not configured".to_string());
        assert_eq!(err.to_string(), "OpenRouter API key is not configured");

        let err = ProviderError::InvalidResponse("No response content received".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid response: No response content received"
        );
    }
}
