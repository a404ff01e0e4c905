//! Benchmark runner.
//!
//! A run walks the bank in (optionally shuffled) order: fetch an answer from
//! the [`AnswerSource`], time it, score it, fold the record into a
//! [`RunTally`]. The tally is a plain value threaded through the loop, so a
//! run has no shared mutable state.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::bank::QuestionBank;
use crate::config::BenchConfig;
use crate::domain::{Category, CategoryAggregate, Question, RunRecord, TruncationWidths};
use crate::grade::{Grade, GradeScale};
use crate::metrics::METRICS;
use crate::obs::{emit_question_scored, emit_run_finished, emit_run_started, run_span};
use crate::scoring::Scorer;
use crate::source::{AnswerSource, PromptStyle};

/// Which benchmark a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// 20 technical questions, linear scoring plus speed bonus.
    Benchmark,
    /// 5 reasoning questions, banded scoring, no speed bonus.
    Cognitive,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Benchmark => "benchmark",
            RunMode::Cognitive => "cognitive",
        }
    }

    pub fn bank(self) -> QuestionBank {
        match self {
            RunMode::Benchmark => QuestionBank::technical(),
            RunMode::Cognitive => QuestionBank::cognitive(),
        }
    }

    pub fn scorer(self) -> Scorer {
        match self {
            RunMode::Benchmark => Scorer::technical(),
            RunMode::Cognitive => Scorer::cognitive(),
        }
    }

    pub fn grade_scale(self) -> GradeScale {
        match self {
            RunMode::Benchmark => GradeScale::Benchmark,
            RunMode::Cognitive => GradeScale::Cognitive,
        }
    }

    pub fn prompt_style(self) -> PromptStyle {
        match self {
            RunMode::Benchmark => PromptStyle::Technical,
            RunMode::Cognitive => PromptStyle::Cognitive,
        }
    }

    pub fn uses_time_bonus(self) -> bool {
        self == RunMode::Benchmark
    }

    /// Character limits for the persisted text columns.
    pub fn widths(self) -> TruncationWidths {
        match self {
            RunMode::Benchmark => TruncationWidths {
                question: 200,
                response: 300,
                reference: 300,
            },
            RunMode::Cognitive => TruncationWidths {
                question: 150,
                response: 200,
                reference: 150,
            },
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Accumulation
// ---------------------------------------------------------------------------

/// Totals accumulated over the records of one run.
///
/// # Invariants
///
/// `total_score` equals the sum of every category's `score`, and
/// `max_score` the sum of every category's `total`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTally {
    pub records: Vec<RunRecord>,
    pub categories: BTreeMap<Category, CategoryAggregate>,
    pub total_score: u32,
    pub max_score: u32,
}

impl RunTally {
    /// Return the tally with `record` folded in.
    pub fn absorb(mut self, record: RunRecord) -> Self {
        let score = record.total_score.min(record.max_score);
        let aggregate = self.categories.entry(record.category).or_default();
        *aggregate = aggregate.absorb(score, record.max_score);
        self.total_score += score;
        self.max_score += record.max_score;
        self.records.push(record);
        self
    }

    pub fn percentage(&self) -> f64 {
        if self.max_score == 0 {
            0.0
        } else {
            self.total_score as f64 / self.max_score as f64 * 100.0
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub run_id: String,
    pub mode: RunMode,
    pub bank: String,
    pub bank_digest: String,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub records: Vec<RunRecord>,
    pub categories: BTreeMap<Category, CategoryAggregate>,
    pub total_score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub grade: Grade,
}

impl RunOutcome {
    pub fn grade_message(&self) -> &'static str {
        self.mode.grade_scale().message(self.grade)
    }

    pub fn question_count(&self) -> usize {
        self.records.len()
    }

    /// Mean response time over all records, in milliseconds.
    pub fn average_response_ms(&self) -> u64 {
        if self.records.is_empty() {
            return 0;
        }
        let sum: u64 = self.records.iter().map(|r| r.response_time_ms).sum();
        sum / self.records.len() as u64
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Runs one bank against one answer source.
#[derive(Debug, Clone)]
pub struct BenchmarkRunner {
    mode: RunMode,
    bank: QuestionBank,
    scorer: Scorer,
    shuffle: bool,
    seed: Option<u64>,
}

impl BenchmarkRunner {
    /// Runner for `mode`'s built-in bank, shuffled with entropy.
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            bank: mode.bank(),
            scorer: mode.scorer(),
            shuffle: true,
            seed: None,
        }
    }

    pub fn from_config(mode: RunMode, config: &BenchConfig) -> Self {
        Self::new(mode)
            .with_shuffle(config.shuffle)
            .with_seed(config.seed)
    }

    pub fn with_bank(mut self, bank: QuestionBank) -> Self {
        self.bank = bank;
        self
    }

    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Questions in the order the next run asks them.
    ///
    /// With a seed the order is the same on every call.
    pub fn run_order(&self) -> Vec<Question> {
        let mut order = self.bank.questions().to_vec();
        if self.shuffle {
            let mut rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            shuffle(&mut order, &mut rng);
        }
        order
    }

    /// Ask every question, score every answer, and return the outcome.
    ///
    /// Never fails: answer sources turn their own failures into sentinel
    /// answers that score zero.
    pub async fn run<S>(&self, source: &mut S) -> RunOutcome
    where
        S: AnswerSource + ?Sized,
    {
        let run_id = Uuid::new_v4().to_string();
        let span = run_span(&run_id, self.mode.as_str());
        self.run_with_id(run_id, source).instrument(span).await
    }

    async fn run_with_id<S>(&self, run_id: String, source: &mut S) -> RunOutcome
    where
        S: AnswerSource + ?Sized,
    {
        let started_at = Utc::now();
        let clock = Instant::now();
        let order = self.run_order();
        let widths = self.mode.widths();

        emit_run_started(&run_id, self.mode.as_str(), source.name(), order.len());
        source.prepare(&order).await;

        let mut tally = RunTally::default();
        for (index, question) in order.iter().enumerate() {
            let asked = Instant::now();
            let answer = source.answer(index, question).await;
            let elapsed = answer.reported_elapsed.unwrap_or_else(|| asked.elapsed());

            let bonus_time = self.mode.uses_time_bonus().then_some(elapsed);
            let evaluation =
                self.scorer
                    .evaluate(&answer.text, &question.correct_answer, bonus_time);
            let record = RunRecord::new(
                question,
                &answer.text,
                &evaluation,
                millis(elapsed),
                widths,
            );

            METRICS.inc_questions_scored();
            emit_question_scored(
                &question.id,
                index + 1,
                record.total_score,
                record.max_score,
                record.response_time_ms,
            );
            debug!(
                question_id = %question.id,
                accuracy = evaluation.accuracy_score,
                speed = evaluation.time_score,
                reasoning = %evaluation.reasoning,
                "answer evaluated"
            );

            tally = tally.absorb(record);
        }

        let percentage = tally.percentage();
        let grade = self.mode.grade_scale().grade(percentage);
        let duration_ms = millis(clock.elapsed());
        emit_run_finished(&run_id, duration_ms, percentage, grade.as_str());

        RunOutcome {
            run_id,
            mode: self.mode,
            bank: self.bank.name().to_string(),
            bank_digest: self.bank.digest(),
            source: source.name().to_string(),
            started_at,
            finished_at: Utc::now(),
            duration_ms,
            records: tally.records,
            categories: tally.categories,
            total_score: tally.total_score,
            max_score: tally.max_score,
            percentage,
            grade,
        }
    }
}

/// Unbiased in-place Fisher–Yates shuffle.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EvaluationResult;

    fn record(category: Category, total: u32, max: u32) -> RunRecord {
        let q = Question::new("q", category, "question", "answer", max);
        let evaluation = EvaluationResult {
            accuracy_score: total,
            time_score: 0,
            reasoning: "x".to_string(),
            ratio: 1.0,
        };
        RunRecord::new(&q, "answer", &evaluation, 10, RunMode::Benchmark.widths())
    }

    #[test]
    fn test_tally_threads_category_totals() {
        let tally = RunTally::default()
            .absorb(record(Category::SqlDatabase, 10, 12))
            .absorb(record(Category::SqlDatabase, 4, 12))
            .absorb(record(Category::CodeCompletion, 12, 12));

        assert_eq!(tally.total_score, 26);
        assert_eq!(tally.max_score, 36);
        assert_eq!(tally.records.len(), 3);
        assert_eq!(tally.categories[&Category::SqlDatabase].score, 14);
        assert_eq!(tally.categories[&Category::SqlDatabase].count, 2);
        let sum: u32 = tally.categories.values().map(|c| c.score).sum();
        assert_eq!(sum, tally.total_score);
    }

    #[test]
    fn test_tally_clamps_overscored_record() {
        let tally = RunTally::default().absorb(record(Category::LogicReasoning, 10, 8));
        assert_eq!(tally.total_score, 8);
        assert_eq!(tally.categories[&Category::LogicReasoning].score, 8);
        assert!((tally.percentage() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_tally_percentage_is_zero() {
        assert_eq!(RunTally::default().percentage(), 0.0);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut items: Vec<u32> = (0..50).collect();
        let mut rng = StdRng::seed_from_u64(9);
        shuffle(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
        assert_ne!(items, sorted);
    }

    #[test]
    fn test_shuffle_positions_are_roughly_uniform() {
        // Each of 3 items should land first about a third of the time.
        let mut first = [0u32; 3];
        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..6000 {
            let mut items = [0usize, 1, 2];
            shuffle(&mut items, &mut rng);
            first[items[0]] += 1;
        }
        for count in first {
            assert!((1700..2300).contains(&count), "count {}", count);
        }
    }

    #[test]
    fn test_seeded_run_order_is_stable() {
        let runner = BenchmarkRunner::new(RunMode::Benchmark).with_seed(Some(5));
        assert_eq!(runner.run_order(), runner.run_order());

        let unshuffled = BenchmarkRunner::new(RunMode::Benchmark).with_shuffle(false);
        let ids: Vec<_> = unshuffled.run_order().into_iter().map(|q| q.id).collect();
        assert_eq!(ids[0], "sql_join_complex");
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_mode_settings() {
        assert!(RunMode::Benchmark.uses_time_bonus());
        assert!(!RunMode::Cognitive.uses_time_bonus());
        assert_eq!(RunMode::Cognitive.widths().response, 200);
        assert_eq!(RunMode::Cognitive.bank().len(), 5);
        assert_eq!(RunMode::Benchmark.to_string(), "benchmark");
    }
}
