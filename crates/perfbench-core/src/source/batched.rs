//! One generator call for the whole question set.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use perfbench_llm::TextGenerator;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    api_error_answer, parse_error_answer, Answer, AnswerSource, PromptStyle, BATCHED_MAX_TOKENS,
};
use crate::domain::Question;
use crate::metrics::METRICS;
use crate::obs::emit_answer_fallback;

// ---------------------------------------------------------------------------
// Reply parsing
// ---------------------------------------------------------------------------

/// How a batched reply was split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    /// `Q<n>:` line prefixes.
    Prefixed,
    /// Paragraphs separated by blank lines, taken in order.
    BlankLine,
}

/// A batched reply split into exactly `expected` answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchedReply {
    pub answers: Vec<String>,
    pub strategy: ParseStrategy,
    /// 1-based numbers of the answers filled with a parse-error placeholder.
    pub missing: Vec<usize>,
}

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"^\s*(?:\*\*)?[Qq](\d+)(?:\*\*)?\s*[:.)]\s*(?:\*\*)?\s*(.*)$")
            .expect("marker pattern is valid")
    })
}

fn blank_line_regex() -> &'static Regex {
    static BLANK: OnceLock<Regex> = OnceLock::new();
    BLANK.get_or_init(|| Regex::new(r"\n[ \t]*\r?\n").expect("blank line pattern is valid"))
}

impl BatchedReply {
    /// Split `reply` into `expected` answers.
    ///
    /// Marker lines start a new answer and following unmarked lines extend
    /// it. When that finds fewer than `expected` answers the reply is also
    /// split on blank lines, and the split yielding more answers wins. Any
    /// remaining gap gets a parse-error placeholder.
    pub fn parse(reply: &str, expected: usize) -> Self {
        let prefixed = split_prefixed(reply, expected);
        let found = count_filled(&prefixed);

        let (slots, strategy) = if found >= expected {
            (prefixed, ParseStrategy::Prefixed)
        } else {
            let paragraphs = split_paragraphs(reply, expected);
            if count_filled(&paragraphs) > found {
                (paragraphs, ParseStrategy::BlankLine)
            } else {
                (prefixed, ParseStrategy::Prefixed)
            }
        };

        let mut missing = Vec::new();
        let answers = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Some(text) if !text.trim().is_empty() => text.trim().to_string(),
                _ => {
                    missing.push(i + 1);
                    parse_error_answer(i + 1)
                }
            })
            .collect();

        Self {
            answers,
            strategy,
            missing,
        }
    }
}

/// Split a batched reply into exactly `expected` trimmed answers.
pub fn parse_batched_reply(reply: &str, expected: usize) -> Vec<String> {
    BatchedReply::parse(reply, expected).answers
}

fn split_prefixed(reply: &str, expected: usize) -> Vec<Option<String>> {
    let mut slots: Vec<Option<String>> = vec![None; expected];
    let mut current: Option<usize> = None;

    for line in reply.lines() {
        if let Some(caps) = marker_regex().captures(line) {
            current = caps[1]
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=expected).contains(n))
                .map(|n| n - 1);
            if let Some(i) = current {
                let text = caps[2].trim().to_string();
                match &mut slots[i] {
                    Some(existing) => {
                        existing.push('\n');
                        existing.push_str(&text);
                    }
                    empty => *empty = Some(text),
                }
            }
            continue;
        }

        if let (Some(i), false) = (current, line.trim().is_empty()) {
            if let Some(existing) = slots[i].as_mut() {
                if !existing.is_empty() {
                    existing.push('\n');
                }
                existing.push_str(line.trim());
            }
        }
    }
    slots
}

fn split_paragraphs(reply: &str, expected: usize) -> Vec<Option<String>> {
    let mut chunks = blank_line_regex()
        .split(reply)
        .map(strip_marker)
        .filter(|chunk| !chunk.is_empty())
        .map(Some);

    (0..expected).map(|_| chunks.next().flatten()).collect()
}

fn strip_marker(chunk: &str) -> String {
    let chunk = chunk.trim();
    let mut lines = chunk.lines();
    match lines.next().and_then(|first| marker_regex().captures(first)) {
        Some(caps) => {
            let mut text = caps[2].trim().to_string();
            for rest in lines {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(rest.trim());
            }
            text.trim().to_string()
        }
        None => chunk.to_string(),
    }
}

fn count_filled(slots: &[Option<String>]) -> usize {
    slots
        .iter()
        .filter(|s| s.as_deref().is_some_and(|t| !t.trim().is_empty()))
        .count()
}

// ---------------------------------------------------------------------------
// BatchedSource
// ---------------------------------------------------------------------------

/// Sends every question in one prompt during [`prepare`](AnswerSource::prepare)
/// and hands out the split answers afterwards.
///
/// Each answer reports the batch's elapsed time divided evenly across the
/// questions.
#[derive(Debug)]
pub struct BatchedSource<G> {
    generator: G,
    style: PromptStyle,
    max_tokens: u32,
    answers: Vec<String>,
    per_question: Duration,
}

impl<G: TextGenerator> BatchedSource<G> {
    pub fn new(generator: G, style: PromptStyle) -> Self {
        Self {
            generator,
            style,
            max_tokens: BATCHED_MAX_TOKENS,
            answers: Vec::new(),
            per_question: Duration::ZERO,
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
impl<G: TextGenerator> AnswerSource for BatchedSource<G> {
    fn name(&self) -> &str {
        "batched"
    }

    async fn prepare(&mut self, questions: &[Question]) {
        let expected = questions.len();
        let prompt = self.style.batched(questions);
        info!(
            questions = expected,
            model = %self.generator.model(),
            "sending batched prompt"
        );

        METRICS.inc_api_calls();
        let started = Instant::now();
        let result = self.generator.generate(&prompt, self.max_tokens).await;
        let elapsed = started.elapsed();
        self.per_question = elapsed / expected.max(1) as u32;

        self.answers = match result {
            Ok(reply) => {
                let parsed = BatchedReply::parse(&reply, expected);
                if parsed.strategy == ParseStrategy::BlankLine {
                    METRICS.inc_parse_fallbacks();
                    warn!("batched reply had too few Q markers, used blank-line split");
                }
                for number in &parsed.missing {
                    emit_answer_fallback(&questions[number - 1].id, "parse_error");
                }
                debug!(
                    strategy = ?parsed.strategy,
                    missing = parsed.missing.len(),
                    "batched reply parsed"
                );
                parsed.answers
            }
            Err(err) => {
                METRICS.inc_api_errors();
                warn!(error = %err, "batched generator call failed");
                let marker = api_error_answer(&err);
                for q in questions {
                    emit_answer_fallback(&q.id, "api_error");
                }
                vec![marker; expected]
            }
        };
    }

    async fn answer(&mut self, index: usize, _question: &Question) -> Answer {
        let text = match self.answers.get(index) {
            Some(text) => text.clone(),
            None => parse_error_answer(index + 1),
        };
        Answer::timed(text, self.per_question)
    }
}
