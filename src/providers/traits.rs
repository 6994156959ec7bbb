use async_trait::async_trait;

use super::types::{ChatRequest, ProviderError};
use crate::providers::ProviderId;

/// One upstream chat API, normalized: takes the provider-agnostic request
/// and returns the assistant's full reply text. Each adapter owns the
/// translation to and from its provider's wire format.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn provider_id(&self) -> ProviderId;

    async fn send_message(&self, request: ChatRequest) -> Result<String, ProviderError>;
}
