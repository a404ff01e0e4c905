//! Client configuration, read from the environment.

use std::time::Duration;

/// Default model used when `PERFBENCH_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";

/// Default API base URL used when `ANTHROPIC_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Default per-call deadline in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Messages API client configuration.
#[derive(Clone, PartialEq)]
pub struct LlmConfig {
    /// API credential sent as `x-api-key`.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Deadline applied to every call (request and body read).
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<REDACTED>")
            .field("api_key_len", &self.api_key.len())
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmConfig {
    /// Config with the given key and default model, URL and deadline.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read `ANTHROPIC_API_KEY`, `PERFBENCH_MODEL`, `ANTHROPIC_BASE_URL` and
    /// `PERFBENCH_TIMEOUT_SECS`. Missing or unparsable values fall back to the
    /// defaults; a missing key is reported later, at call time.
    pub fn from_env() -> Self {
        let mut config = Self::new(std::env::var("ANTHROPIC_API_KEY").unwrap_or_default());
        if let Ok(model) = std::env::var("PERFBENCH_MODEL") {
            if !model.trim().is_empty() {
                config.model = model;
            }
        }
        if let Ok(url) = std::env::var("ANTHROPIC_BASE_URL") {
            if !url.trim().is_empty() {
                config = config.with_base_url(&url);
            }
        }
        if let Some(secs) = std::env::var("PERFBENCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }

    /// Override the model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Override the base URL; a trailing slash is dropped.
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a non-empty key is present.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
