//! Per-question results and per-category totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::question::{Category, Question};

/// Scorer output for one answer. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Accuracy points, 0..=10.
    pub accuracy_score: u32,
    /// Speed bonus, 0..=2 (always 0 in cognitive mode).
    pub time_score: u32,
    /// Qualitative label for the accuracy band.
    pub reasoning: String,
    /// Matched / considered reference tokens, 0.0..=1.0.
    pub ratio: f64,
}

impl EvaluationResult {
    pub fn total(&self) -> u32 {
        self.accuracy_score + self.time_score
    }
}

/// Character limits applied to the text columns of a [`RunRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationWidths {
    pub question: usize,
    pub response: usize,
    pub reference: usize,
}

/// One scored question, as persisted to the results CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp: DateTime<Utc>,
    pub test_id: String,
    pub category: Category,
    /// Question text, truncated.
    pub question: String,
    /// Candidate reply, truncated.
    pub candidate_response: String,
    /// Reference answer, truncated.
    pub correct_answer: String,
    pub accuracy_score: u32,
    pub time_score: u32,
    pub total_score: u32,
    /// Maximum points for this question.
    pub max_score: u32,
    pub reasoning: String,
    pub response_time_ms: u64,
}

impl RunRecord {
    /// Build the record for `question` from its reply and evaluation.
    pub fn new(
        question: &Question,
        response: &str,
        evaluation: &EvaluationResult,
        response_time_ms: u64,
        widths: TruncationWidths,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            test_id: question.id.clone(),
            category: question.category,
            question: truncate_chars(&question.question, widths.question),
            candidate_response: truncate_chars(response, widths.response),
            correct_answer: truncate_chars(&question.correct_answer, widths.reference),
            accuracy_score: evaluation.accuracy_score,
            time_score: evaluation.time_score,
            total_score: evaluation.total(),
            max_score: question.points,
            reasoning: evaluation.reasoning.clone(),
            response_time_ms,
        }
    }
}

/// Running totals for one category.
///
/// # Invariants
///
/// `score <= total`, and `total` is the sum of `points` of every question
/// absorbed so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub score: u32,
    pub total: u32,
    pub count: u32,
}

impl CategoryAggregate {
    /// Return the aggregate with one more question folded in.
    ///
    /// `score` is clamped to `max` so the invariant holds even for a
    /// misconfigured question whose evaluation exceeds its points.
    pub fn absorb(self, score: u32, max: u32) -> Self {
        Self {
            score: self.score + score.min(max),
            total: self.total + max,
            count: self.count + 1,
        }
    }

    /// Score as a percentage of the category maximum.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.score as f64 / self.total as f64 * 100.0
        }
    }

    /// Mean points per question.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.score as f64 / self.count as f64
        }
    }
}

/// Truncate to at most `max` characters, on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluation(accuracy: u32, time: u32) -> EvaluationResult {
        EvaluationResult {
            accuracy_score: accuracy,
            time_score: time,
            reasoning: "Good".to_string(),
            ratio: 0.5,
        }
    }

    #[test]
    fn test_truncate_chars_respects_multibyte() {
        assert_eq!(truncate_chars("P(D|+) ≈ 0.161", 9), "P(D|+) ≈ ");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_run_record_truncates_columns() {
        let question = Question::new(
            "q",
            Category::LogicAlgorithm,
            &"x".repeat(500),
            &"y".repeat(500),
            12,
        );
        let widths = TruncationWidths {
            question: 200,
            response: 300,
            reference: 300,
        };
        let record = RunRecord::new(&question, &"z".repeat(1000), &evaluation(7, 2), 1500, widths);

        assert_eq!(record.question.len(), 200);
        assert_eq!(record.candidate_response.len(), 300);
        assert_eq!(record.correct_answer.len(), 300);
        assert_eq!(record.total_score, 9);
        assert_eq!(record.max_score, 12);
        assert_eq!(record.response_time_ms, 1500);
    }

    #[test]
    fn test_category_aggregate_absorb() {
        let agg = CategoryAggregate::default()
            .absorb(10, 12)
            .absorb(6, 12)
            .absorb(12, 12);
        assert_eq!(agg.score, 28);
        assert_eq!(agg.total, 36);
        assert_eq!(agg.count, 3);
        assert!((agg.average() - 28.0 / 3.0).abs() < 1e-9);
        assert!((agg.percentage() - 28.0 / 36.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_aggregate_score_never_exceeds_total() {
        let agg = CategoryAggregate::default().absorb(15, 12);
        assert_eq!(agg.score, 12);
        assert!(agg.score <= agg.total);
    }

    #[test]
    fn test_empty_aggregate_ratios_are_zero() {
        let agg = CategoryAggregate::default();
        assert_eq!(agg.percentage(), 0.0);
        assert_eq!(agg.average(), 0.0);
    }
}
