//! Messages API client.
//!
//! One request per `generate` call: a single user message, no system prompt,
//! no tools. Text blocks of the reply are concatenated in order.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::{Result, TextGenerator};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// HTTP client for the Messages API.
pub struct MessagesClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl std::fmt::Debug for MessagesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagesClient")
            .field("config", &self.config)
            .finish()
    }
}

impl MessagesClient {
    /// Build a client for `config`.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("perfbench/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    /// Build a client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(LlmConfig::from_env())
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }

    async fn send(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let body = request_body(&self.config.model, prompt, max_tokens);

        let response = self
            .http
            .post(self.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        extract_text(&text)
    }
}

#[async_trait]
impl TextGenerator for MessagesClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        if !self.config.has_api_key() {
            return Err(LlmError::MissingApiKey);
        }

        debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            max_tokens,
            "sending messages request"
        );

        let reply = tokio::time::timeout(self.config.timeout, self.send(prompt, max_tokens))
            .await
            .map_err(|_| LlmError::Timeout {
                secs: self.config.timeout.as_secs(),
            })??;

        debug!(reply_len = reply.len(), "received messages reply");
        Ok(reply)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// JSON body for a single-turn request.
pub fn request_body(model: &str, prompt: &str, max_tokens: u32) -> Value {
    json!({
        "model": model,
        "max_tokens": max_tokens,
        "messages": [{
            "role": "user",
            "content": prompt,
        }],
    })
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Concatenate the text blocks of a successful reply body.
pub fn extract_text(body: &str) -> Result<String> {
    let response: MessagesResponse = serde_json::from_str(body)?;
    let text: String = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(text)
}

/// Pull the human-readable message out of an error body, or return the
/// first 200 characters of the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.chars().take(200).collect(),
    }
}
