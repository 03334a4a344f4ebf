pub mod anthropic;

pub use anthropic::AnthropicGateway;

use crate::error::GatewayError;
use async_trait::async_trait;

/// The raw text of one completion, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCompletion {
    pub text: String,
}

/// Boundary to the external completion capability. The engine depends only
/// on this contract; cancellation and transport timeouts live behind it.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Submit a prompt and receive the first text block of the response.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<RawCompletion, GatewayError>;
}
