pub mod googleai;
pub mod openrouter;
pub mod traits;
pub mod types;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use googleai::GoogleAiProvider;
pub use openrouter::OpenRouterProvider;
pub use traits::ChatProvider;
pub use types::{
    ChatRequest, ContentPart, DocumentData, ImageUrl, MessageContent, ProviderError,
    RequestMessage, RequestRole,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenRouter,
    GoogleAi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenRouter => "openrouter",
            ProviderId::GoogleAi => "googleai",
        }
    }

    /// Default model for the provider, matching the portal's choices.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::OpenRouter => "google/gemma-3-27b-it:free",
            ProviderId::GoogleAi => "gemini-2.0-flash-lite",
        }
    }
}

impl std::str::FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openrouter" => Ok(ProviderId::OpenRouter),
            "googleai" | "google-ai" | "google" => Ok(ProviderId::GoogleAi),
            other => Err(format!("Unknown provider: {}", other)),
        }
    }
}

/// Build the adapter for `provider_id`. The orchestrator only ever sees
/// the trait object, so the two upstreams stay interchangeable.
pub fn create_provider(provider_id: ProviderId, api_key: String) -> Arc<dyn ChatProvider> {
    match provider_id {
        ProviderId::OpenRouter => Arc::new(openrouter::OpenRouterProvider::new(api_key)),
        ProviderId::GoogleAi => Arc::new(googleai::GoogleAiProvider::new(api_key)),
    }
}
