//! Answer sources.
//!
//! The runner never talks to the network directly. It asks an
//! [`AnswerSource`] for each question's answer; the three implementations
//! are interchangeable:
//!
//! - [`SimulatedSource`]: canned answers keyed by question id
//! - [`LiveSource`]: one generator call per question
//! - [`BatchedSource`]: one generator call for the whole bank, split back
//!   into answers by [`parse_batched_reply`]
//!
//! Sources never fail. A failed generator call becomes an
//! `[API Error: ...]` answer that scores zero through the normal scorer.

mod batched;
mod live;
mod simulated;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Question;

pub use batched::{parse_batched_reply, BatchedReply, BatchedSource, ParseStrategy};
pub use live::LiveSource;
pub use simulated::SimulatedSource;

/// `max_tokens` for a single-question call.
pub const SINGLE_MAX_TOKENS: u32 = 800;

/// `max_tokens` for the combined batched call.
pub const BATCHED_MAX_TOKENS: u32 = 4000;

/// One candidate answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    /// Elapsed time the source attributes to this answer. When `None` the
    /// runner uses its own wall-clock measurement.
    pub reported_elapsed: Option<Duration>,
}

impl Answer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reported_elapsed: None,
        }
    }

    pub fn timed(text: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            text: text.into(),
            reported_elapsed: Some(elapsed),
        }
    }
}

/// Supplies candidate answers to the runner, one question at a time.
#[async_trait]
pub trait AnswerSource: Send {
    /// Short label used in logs ("simulated", "live", "batched").
    fn name(&self) -> &str;

    /// Called once with the questions in run order before the first
    /// [`answer`](AnswerSource::answer).
    async fn prepare(&mut self, _questions: &[Question]) {}

    /// Answer the question at `index` of the run order.
    async fn answer(&mut self, index: usize, question: &Question) -> Answer;
}

/// Wording used when asking a generator a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStyle {
    Technical,
    Cognitive,
}

impl PromptStyle {
    /// Prompt for a single question.
    pub fn single(self, question: &Question) -> String {
        match self {
            PromptStyle::Technical => format!(
                "You are being benchmarked on practical programming knowledge. \
                 Answer the following question accurately and concisely:\n\n{}\n\n\
                 Give working code or a precise technical explanation.",
                question.question
            ),
            PromptStyle::Cognitive => format!(
                "You are being tested on advanced reasoning and programming knowledge. \
                 Please provide a precise, analytical answer to this question:\n\n{}\n\n\
                 Provide a thorough but concise response that demonstrates your reasoning process.",
                question.question
            ),
        }
    }

    /// Prompt carrying every question, numbered from 1.
    pub fn batched(self, questions: &[Question]) -> String {
        let intro = match self {
            PromptStyle::Technical => {
                "You are being benchmarked on practical programming knowledge."
            }
            PromptStyle::Cognitive => {
                "You are being tested on advanced reasoning and programming knowledge."
            }
        };
        let mut prompt = format!(
            "{intro} Answer each of the following {} questions accurately and concisely.\n\n",
            questions.len()
        );
        for (i, q) in questions.iter().enumerate() {
            prompt.push_str(&format!("Q{}: {}\n\n", i + 1, q.question));
        }
        prompt.push_str(
            "Format your reply with one answer per question, each starting on a new line \
             with its marker, exactly like:\nQ1: <answer>\nQ2: <answer>\n",
        );
        prompt
    }
}

/// Answer text substituted for a failed generator call.
pub fn api_error_answer(err: &dyn fmt::Display) -> String {
    format!("[API Error: {}]", err)
}

/// Answer text substituted for a batched answer that could not be found.
pub fn parse_error_answer(number: usize) -> String {
    format!("[Parse Error: no answer for Q{}]", number)
}
