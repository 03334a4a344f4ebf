use super::{CompletionGateway, RawCompletion};
use crate::error::GatewayError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Messages-API adapter for the Anthropic completion endpoint.
pub struct AnthropicGateway {
    api_key: String,
    model: String,
    cached_messages_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    #[serde(rename = "type")]
    kind: Option<String>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: String,
}

impl AnthropicGateway {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, "https://api.anthropic.com")
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            cached_messages_url: format!("{}/v1/messages", base_url.trim_end_matches('/')),
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .connect_timeout(Duration::from_secs(10))
                .pool_max_idle_per_host(10)
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Map an error payload onto the gateway taxonomy. `overloaded_error`
    /// (and HTTP 529) is the only transient kind the caller may retry later.
    fn classify_error(status: u16, body: &str) -> GatewayError {
        if status == 529 {
            return GatewayError::Overloaded;
        }
        if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(body) {
            if envelope.kind.as_deref() == Some("error") {
                if let Some(error) = envelope.error {
                    if error.kind == "overloaded_error" {
                        return GatewayError::Overloaded;
                    }
                    return GatewayError::Transport(format!(
                        "{} ({}): {}",
                        error.kind, status, error.message
                    ));
                }
            }
        }
        GatewayError::Transport(format!("HTTP {status}: {body}"))
    }

    fn first_text_block(response: MessagesResponse) -> Result<RawCompletion, GatewayError> {
        response
            .content
            .into_iter()
            .find_map(|block| match block {
                ResponseContentBlock::Text { text } => Some(RawCompletion { text }),
                ResponseContentBlock::Unsupported => None,
            })
            .ok_or_else(|| GatewayError::Malformed("response carried no text block".into()))
    }
}

#[async_trait]
impl CompletionGateway for AnthropicGateway {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<RawCompletion, GatewayError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            system: (!system.is_empty()).then_some(system),
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .client
            .post(&self.cached_messages_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_error(status, &body));
        }

        let payload: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        Self::first_text_block(payload)
    }
}
