//! Structured lifecycle events for benchmark runs.
//!
//! Every event carries an `event` field so log pipelines can filter on it.
//! [`RunSpan`] tags everything logged during a run with its `run_id`.

use std::path::Path;

use tracing::{info, warn};

/// Span tagging everything logged during one run.
///
/// Async code attaches it with `tracing::Instrument`; synchronous code can
/// hold a [`RunSpan`] instead.
pub fn run_span(run_id: &str, mode: &str) -> tracing::Span {
    tracing::info_span!("perfbench.run", run_id = %run_id, mode = %mode)
}

/// RAII guard that keeps a run-scoped span entered.
///
/// ```ignore
/// let _span = RunSpan::enter("3f2a...", "daily");
/// // events logged here carry run_id and mode
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(run_id: &str, mode: &str) -> Self {
        Self {
            _span: run_span(run_id, mode).entered(),
        }
    }
}

pub fn emit_run_started(run_id: &str, mode: &str, source: &str, questions: usize) {
    info!(
        event = "run.started",
        run_id = %run_id,
        mode = %mode,
        source = %source,
        questions = questions,
    );
}

pub fn emit_question_scored(
    question_id: &str,
    position: usize,
    total_score: u32,
    max_score: u32,
    response_time_ms: u64,
) {
    info!(
        event = "question.scored",
        question_id = %question_id,
        position = position,
        total_score = total_score,
        max_score = max_score,
        response_time_ms = response_time_ms,
    );
}

/// A sentinel answer was substituted (`reason` is `api_error` or `parse_error`).
pub fn emit_answer_fallback(question_id: &str, reason: &str) {
    warn!(event = "answer.fallback", question_id = %question_id, reason = %reason);
}

pub fn emit_run_finished(run_id: &str, duration_ms: u64, percentage: f64, grade: &str) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        percentage = percentage,
        grade = %grade,
    );
}

pub fn emit_report_written(kind: &str, path: &Path) {
    info!(event = "report.written", kind = %kind, path = %path.display());
}

/// A report could not be written; the caller carries on.
pub fn emit_report_write_failed(kind: &str, path: &Path, error: &dyn std::fmt::Display) {
    warn!(
        event = "report.write_failed",
        kind = %kind,
        path = %path.display(),
        error = %error,
    );
}

pub fn emit_daily_finished(date: &str, combined: f64, elapsed_secs: u64, trend: &str) {
    info!(
        event = "daily.finished",
        date = %date,
        combined = combined,
        elapsed_secs = elapsed_secs,
        trend = %trend,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_span_create() {
        let _span = RunSpan::enter("test-run-id", "benchmark");
        emit_run_started("test-run-id", "benchmark", "simulated", 20);
        emit_report_write_failed("csv", Path::new("/nowhere"), &"denied");
    }
}
