//! perfbench core library.
//!
//! Question banks, the lexical-overlap scorer, answer sources, the
//! benchmark runner, results CSVs and the daily orchestrator.

pub mod bank;
pub mod config;
pub mod daily;
pub mod domain;
pub mod grade;
pub mod metrics;
pub mod obs;
pub mod report;
pub mod runner;
pub mod scoring;
pub mod source;
pub mod telemetry;

pub use bank::QuestionBank;
pub use config::BenchConfig;
pub use daily::{
    analyze_trend, combined_score, read_history, summarize_history, DailyOutcome, DailyRunner,
    DailySummary, HistoryEntry, HistorySummary, Trend, TrendReport,
};
pub use domain::{
    BenchError, Category, CategoryAggregate, EvaluationResult, Question, Result, RunRecord,
};
pub use grade::{Grade, GradeScale};
pub use metrics::METRICS;
pub use obs::{
    emit_answer_fallback, emit_daily_finished, emit_question_scored, emit_report_write_failed,
    emit_report_written, emit_run_finished, emit_run_started, run_span, RunSpan,
};
pub use report::{prepare_results_file, save_outcome, ResultsFile};
pub use runner::{BenchmarkRunner, RunMode, RunOutcome, RunTally};
pub use scoring::{time_bonus, Scorer, ScoringProfile, SynonymTable};
pub use source::{
    parse_batched_reply, Answer, AnswerSource, BatchedSource, LiveSource, PromptStyle,
    SimulatedSource,
};
pub use telemetry::init_tracing;

/// Crate version, for `--version` output and report headers.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
