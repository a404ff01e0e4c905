//! Domain-level error taxonomy for perfbench.

/// perfbench domain errors.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid question bank: {0}")]
    InvalidBank(String),

    #[error("duplicate question id: {0}")]
    DuplicateQuestion(String),

    #[error("invalid history line {line}: {reason}")]
    InvalidHistoryLine { line: usize, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("llm error: {0}")]
    Llm(#[from] perfbench_llm::LlmError),
}

/// Result type for perfbench domain operations.
pub type Result<T> = std::result::Result<T, BenchError>;
