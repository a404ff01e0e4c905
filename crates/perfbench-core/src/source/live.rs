//! One generator call per question.

use async_trait::async_trait;
use perfbench_llm::TextGenerator;
use tracing::{debug, warn};

use super::{api_error_answer, Answer, AnswerSource, PromptStyle, SINGLE_MAX_TOKENS};
use crate::domain::Question;
use crate::metrics::METRICS;
use crate::obs::emit_answer_fallback;

/// Asks `G` each question in turn.
#[derive(Debug)]
pub struct LiveSource<G> {
    generator: G,
    style: PromptStyle,
    max_tokens: u32,
}

impl<G: TextGenerator> LiveSource<G> {
    pub fn new(generator: G, style: PromptStyle) -> Self {
        Self {
            generator,
            style,
            max_tokens: SINGLE_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }
}

#[async_trait]
impl<G: TextGenerator> AnswerSource for LiveSource<G> {
    fn name(&self) -> &str {
        "live"
    }

    async fn answer(&mut self, _index: usize, question: &Question) -> Answer {
        let prompt = self.style.single(question);
        METRICS.inc_api_calls();
        debug!(question_id = %question.id, model = %self.generator.model(), "asking generator");

        match self.generator.generate(&prompt, self.max_tokens).await {
            Ok(text) => Answer::new(text),
            Err(err) => {
                METRICS.inc_api_errors();
                warn!(question_id = %question.id, error = %err, "generator call failed");
                emit_answer_fallback(&question.id, "api_error");
                Answer::new(api_error_answer(&err))
            }
        }
    }
}
