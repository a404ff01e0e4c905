//! perfbench-llm: text generation over the hosted Messages API.
//!
//! The benchmark harness only needs one capability from a model: turn a
//! prompt into text. That capability is the [`TextGenerator`] trait; the
//! HTTP implementation is [`MessagesClient`], and [`fakes`] provides scripted
//! generators for tests that must not touch the network.

pub mod client;
pub mod config;
pub mod error;
pub mod fakes;

use async_trait::async_trait;

pub use client::MessagesClient;
pub use config::LlmConfig;
pub use error::LlmError;

/// Result type for text-generation operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Anything that can answer a prompt with text.
///
/// Implementations must enforce their own deadline; callers never wrap
/// `generate` in an extra timeout.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` and return the reply text.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;

    /// Model identifier used for logging.
    fn model(&self) -> &str;
}
