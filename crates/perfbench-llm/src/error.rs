//! Error taxonomy for text-generation calls.

/// Errors produced while calling the text-generation API.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API key is not configured (set ANTHROPIC_API_KEY)")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response contained no text content")]
    EmptyContent,

    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("scripted failure: {0}")]
    Scripted(String),
}
