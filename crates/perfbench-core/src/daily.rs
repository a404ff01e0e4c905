//! Daily orchestration: both benchmarks, a combined score, history and
//! dated reports.
//!
//! One daily run executes the technical benchmark and then the cognitive
//! benchmark, weights them 70/30, appends one tab-separated line to
//! `daily-results.log` and writes five report files into `Reports/`.
//! Report failures are logged and never abort the remaining reports.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Instrument};

use crate::config::BenchConfig;
use crate::domain::{BenchError, Result};
use crate::grade::{Grade, GradeScale};
use crate::obs::{emit_daily_finished, emit_report_write_failed, emit_report_written, run_span};
use crate::report::{prepare_results_file, save_outcome};
use crate::runner::{BenchmarkRunner, RunMode, RunOutcome};
use crate::source::AnswerSource;

pub const HISTORY_FILE: &str = "daily-results.log";

pub const BENCHMARK_WEIGHT: f64 = 0.7;
pub const COGNITIVE_WEIGHT: f64 = 0.3;

/// Score change between first and last history entry that counts as a trend.
pub const TREND_THRESHOLD: f64 = 5.0;

/// `0.7 * benchmark + 0.3 * cognitive`.
pub fn combined_score(benchmark_percentage: f64, cognitive_percentage: f64) -> f64 {
    benchmark_percentage * BENCHMARK_WEIGHT + cognitive_percentage * COGNITIVE_WEIGHT
}

// ---------------------------------------------------------------------------
// History log
// ---------------------------------------------------------------------------

/// One line of `daily-results.log`:
/// `date<TAB>score%<TAB>secs s<TAB>clock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: String,
    pub score: f64,
    pub elapsed_secs: Option<u64>,
    /// Local wall-clock time of the run; `N/A` for entries written without one.
    pub clock: String,
}

impl HistoryEntry {
    /// Parse one log line. `line_no` is 1-based and only used in errors.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let invalid = |reason: &str| BenchError::InvalidHistoryLine {
            line: line_no,
            reason: reason.to_string(),
        };

        let mut parts = line.trim_end_matches(&['\r', '\n'][..]).split('\t');
        let date = parts
            .next()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| invalid("missing date"))?;
        let score = parts
            .next()
            .ok_or_else(|| invalid("missing score column"))?
            .trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .map_err(|e| invalid(&format!("bad score: {}", e)))?;
        if !score.is_finite() {
            return Err(invalid("score is not a finite number"));
        }
        let elapsed_secs = parts
            .next()
            .and_then(|t| t.trim().trim_end_matches('s').parse::<u64>().ok());
        let clock = parts
            .next()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("N/A")
            .to_string();

        Ok(Self {
            date: date.to_string(),
            score,
            elapsed_secs,
            clock,
        })
    }

    /// The log line for this entry, newline included.
    pub fn to_line(&self) -> String {
        let elapsed = self
            .elapsed_secs
            .map(|s| format!("{}s", s))
            .unwrap_or_else(|| "N/A".to_string());
        format!("{}\t{:.1}%\t{}\t{}\n", self.date, self.score, elapsed, self.clock)
    }
}

/// Parse a whole history log, skipping blank and malformed lines.
pub fn parse_history(content: &str) -> Vec<HistoryEntry> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(i, line)| match HistoryEntry::parse_line(line, i + 1) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping history line");
                None
            }
        })
        .collect()
}

/// Read the history log at `path`; a missing file is an empty history.
pub fn read_history(path: &Path) -> Result<Vec<HistoryEntry>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(parse_history(&content)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(err.into()),
    }
}

pub fn append_history(path: &Path, entry: &HistoryEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(entry.to_line().as_bytes())?;
    Ok(())
}

/// Aggregate view of the whole history, for the `history` listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub runs: usize,
    pub average: f64,
    pub latest: f64,
    /// Sign of `latest - average`: 1 above, -1 below, 0 equal.
    pub direction: i8,
}

pub fn summarize_history(entries: &[HistoryEntry]) -> Option<HistorySummary> {
    let latest = entries.last()?.score;
    let average = entries.iter().map(|e| e.score).sum::<f64>() / entries.len() as f64;
    let direction = if latest > average {
        1
    } else if latest < average {
        -1
    } else {
        0
    };
    Some(HistorySummary {
        runs: entries.len(),
        average,
        latest,
        direction,
    })
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    InsufficientData,
    Improving,
    Stable,
    Declining,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::InsufficientData => "insufficient_data",
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
        }
    }
}

/// Contents of `trends-<date>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub trend: Trend,
    pub average: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement: Option<f64>,
    pub data_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

/// Compare the first and last historical scores.
///
/// Fewer than two entries is `insufficient_data`, with the single score (or
/// 0) as the average.
pub fn analyze_trend(entries: &[HistoryEntry]) -> TrendReport {
    let scores: Vec<f64> = entries.iter().map(|e| e.score).collect();
    if scores.len() < 2 {
        return TrendReport {
            trend: Trend::InsufficientData,
            average: scores.first().copied().unwrap_or(0.0),
            improvement: None,
            data_points: scores.len(),
            last_score: None,
            recommendations: Vec::new(),
        };
    }

    let average = scores.iter().sum::<f64>() / scores.len() as f64;
    let last = scores[scores.len() - 1];
    let improvement = last - scores[0];
    let trend = if improvement > TREND_THRESHOLD {
        Trend::Improving
    } else if improvement < -TREND_THRESHOLD {
        Trend::Declining
    } else {
        Trend::Stable
    };

    TrendReport {
        trend,
        average,
        improvement: Some(improvement),
        data_points: scores.len(),
        last_score: Some(last),
        recommendations: recommendations(average, improvement),
    }
}

pub fn recommendations(average: f64, improvement: f64) -> Vec<String> {
    let mut recs = Vec::new();
    if average < 70.0 {
        recs.push("Focus on fundamental improvements");
    }
    if improvement < -TREND_THRESHOLD {
        recs.push("Performance declining - investigate");
    }
    if improvement > TREND_THRESHOLD {
        recs.push("Great improvement trend!");
    }
    if average > 90.0 {
        recs.push("Excellent performance!");
    }
    if recs.is_empty() {
        recs.push("Performance tracking active");
    }
    recs.into_iter().map(String::from).collect()
}

// ---------------------------------------------------------------------------
// Summary reports
// ---------------------------------------------------------------------------

/// Contents of `summary-<date>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: String,
    pub timestamp: DateTime<Utc>,
    pub benchmark_score: f64,
    pub cognitive_score: f64,
    pub overall_score: f64,
    pub elapsed_secs: u64,
    pub grade: Grade,
}

impl DailySummary {
    pub fn new(date: &str, benchmark: f64, cognitive: f64, elapsed_secs: u64) -> Self {
        let overall = combined_score(benchmark, cognitive);
        Self {
            date: date.to_string(),
            timestamp: Utc::now(),
            benchmark_score: benchmark,
            cognitive_score: cognitive,
            overall_score: overall,
            elapsed_secs,
            grade: GradeScale::Benchmark.grade(overall),
        }
    }
}

fn score_color(score: f64) -> &'static str {
    if score >= 80.0 {
        "#10B981"
    } else {
        "#F59E0B"
    }
}

pub fn render_dashboard_html(summary: &DailySummary) -> String {
    let color = score_color(summary.overall_score);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>AI Performance Dashboard - {date}</title>
    <style>
        body {{ font-family: Arial, sans-serif; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); margin: 0; padding: 20px; min-height: 100vh; }}
        .container {{ max-width: 800px; margin: 0 auto; background: white; border-radius: 20px; box-shadow: 0 20px 40px rgba(0,0,0,0.1); }}
        .header {{ background: linear-gradient(135deg, #2D3748 0%, #4A5568 100%); color: white; padding: 30px; text-align: center; border-radius: 20px 20px 0 0; }}
        .header h1 {{ font-size: 2.5rem; margin: 0 0 10px 0; }}
        .dashboard {{ padding: 40px; }}
        .score-card {{ background: #f8f9fa; padding: 40px; border-radius: 15px; text-align: center; margin-bottom: 30px; border-left: 5px solid {color}; }}
        .score-value {{ font-size: 4rem; font-weight: bold; color: #2D3748; margin-bottom: 10px; }}
        .score-label {{ font-size: 1.2rem; color: #718096; }}
        .breakdown {{ display: flex; justify-content: space-around; color: #4A5568; }}
        .grade {{ padding: 10px 20px; border-radius: 25px; background: {color}; color: white; display: inline-block; margin-top: 15px; }}
        .timestamp {{ text-align: center; color: #718096; margin-top: 20px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>AI Performance Dashboard</h1>
            <p>Daily Performance Report - {date}</p>
        </div>
        <div class="dashboard">
            <div class="score-card">
                <div class="score-value">{overall:.1}%</div>
                <div class="score-label">Overall Performance</div>
                <div class="grade">{grade}</div>
            </div>
            <div class="breakdown">
                <div>Benchmark (70%): {benchmark:.1}%</div>
                <div>Cognitive (30%): {cognitive:.1}%</div>
                <div>Duration: {elapsed}s</div>
            </div>
            <div class="timestamp">Generated at {generated}</div>
        </div>
    </div>
</body>
</html>
"#,
        date = summary.date,
        color = color,
        overall = summary.overall_score,
        grade = summary.grade.display_name(),
        benchmark = summary.benchmark_score,
        cognitive = summary.cognitive_score,
        elapsed = summary.elapsed_secs,
        generated = summary.timestamp.to_rfc3339(),
    )
}

pub fn render_summary_csv(summary: &DailySummary) -> String {
    format!(
        "Date,Score,Benchmark,Cognitive,Time,Grade\n{},{:.1}%,{:.1}%,{:.1}%,{}s,{}\n",
        summary.date,
        summary.overall_score,
        summary.benchmark_score,
        summary.cognitive_score,
        summary.elapsed_secs,
        summary.grade
    )
}

pub fn render_summary_text(summary: &DailySummary) -> String {
    format!(
        "AI Performance Summary - {date}\n\
         ========================================\n\
         Score: {overall:.1}%\n\
         Benchmark: {benchmark:.1}% (70%)\n\
         Cognitive: {cognitive:.1}% (30%)\n\
         Time: {elapsed}s\n\
         Grade: {grade}\n\
         Date: {date}\n\
         \n\
         Generated: {generated}\n",
        date = summary.date,
        overall = summary.overall_score,
        benchmark = summary.benchmark_score,
        cognitive = summary.cognitive_score,
        elapsed = summary.elapsed_secs,
        grade = summary.grade,
        generated = summary.timestamp.to_rfc3339(),
    )
}

fn write_report(dir: &Path, kind: &str, file_name: String, content: &str) -> Option<PathBuf> {
    let path = dir.join(file_name);
    let result = fs::create_dir_all(dir)
        .with_context(|| format!("create directory {}", dir.display()))
        .and_then(|_| {
            fs::write(&path, content).with_context(|| format!("write {}", path.display()))
        });
    match result {
        Ok(()) => {
            emit_report_written(kind, &path);
            Some(path)
        }
        Err(err) => {
            emit_report_write_failed(kind, &path, &format!("{:#}", err));
            None
        }
    }
}

/// Write the dashboard, trend and summary files into `reports_dir`.
///
/// Returns the paths that were written; failures are logged and skipped.
pub fn write_daily_reports(
    reports_dir: &Path,
    summary: &DailySummary,
    trend: &TrendReport,
) -> Vec<PathBuf> {
    let date = &summary.date;
    let mut written = Vec::new();

    written.extend(write_report(
        reports_dir,
        "dashboard",
        format!("dashboard-{}.html", date),
        &render_dashboard_html(summary),
    ));

    match serde_json::to_string_pretty(trend) {
        Ok(json) => written.extend(write_report(
            reports_dir,
            "trends",
            format!("trends-{}.json", date),
            &json,
        )),
        Err(err) => emit_report_write_failed("trends", reports_dir, &err),
    }

    match serde_json::to_string_pretty(summary) {
        Ok(json) => written.extend(write_report(
            reports_dir,
            "summary_json",
            format!("summary-{}.json", date),
            &json,
        )),
        Err(err) => emit_report_write_failed("summary_json", reports_dir, &err),
    }

    written.extend(write_report(
        reports_dir,
        "summary_csv",
        format!("summary-{}.csv", date),
        &render_summary_csv(summary),
    ));
    written.extend(write_report(
        reports_dir,
        "summary_txt",
        format!("summary-{}.txt", date),
        &render_summary_text(summary),
    ));

    written
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Everything one daily run produced.
#[derive(Debug, Clone)]
pub struct DailyOutcome {
    pub benchmark: RunOutcome,
    pub cognitive: RunOutcome,
    pub summary: DailySummary,
    pub trend: TrendReport,
    pub history: Vec<HistoryEntry>,
    pub reports: Vec<PathBuf>,
}

/// Runs the technical and cognitive benchmarks back to back.
#[derive(Debug, Clone)]
pub struct DailyRunner {
    config: BenchConfig,
    date: NaiveDate,
}

impl DailyRunner {
    /// Runner dated today (UTC).
    pub fn new(config: BenchConfig) -> Self {
        Self {
            config,
            date: Utc::now().date_naive(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn history_path(&self) -> PathBuf {
        self.config.output_path(HISTORY_FILE)
    }

    pub async fn run<B, C>(&self, benchmark_source: &mut B, cognitive_source: &mut C) -> DailyOutcome
    where
        B: AnswerSource + ?Sized,
        C: AnswerSource + ?Sized,
    {
        let date = self.date();
        let span = run_span(&format!("daily-{}", date), "daily");
        self.run_both(date, benchmark_source, cognitive_source)
            .instrument(span)
            .await
    }

    async fn run_both<B, C>(
        &self,
        date: String,
        benchmark_source: &mut B,
        cognitive_source: &mut C,
    ) -> DailyOutcome
    where
        B: AnswerSource + ?Sized,
        C: AnswerSource + ?Sized,
    {
        let clock = Instant::now();
        info!(date = %date, "starting daily performance check");

        let benchmark = self.run_mode(RunMode::Benchmark, benchmark_source).await;
        let cognitive = self.run_mode(RunMode::Cognitive, cognitive_source).await;

        let elapsed_secs = clock.elapsed().as_secs_f64().round() as u64;
        let summary = DailySummary::new(
            &date,
            benchmark.percentage,
            cognitive.percentage,
            elapsed_secs,
        );
        info!(
            benchmark = benchmark.percentage,
            cognitive = cognitive.percentage,
            combined = summary.overall_score,
            "combined score computed"
        );

        let history_path = self.history_path();
        let entry = HistoryEntry {
            date: date.clone(),
            score: summary.overall_score,
            elapsed_secs: Some(elapsed_secs),
            clock: Local::now().format("%H:%M:%S").to_string(),
        };
        match append_history(&history_path, &entry) {
            Ok(()) => emit_report_written("history", &history_path),
            Err(err) => emit_report_write_failed("history", &history_path, &err),
        }

        let history = match read_history(&history_path) {
            Ok(history) => history,
            Err(err) => {
                warn!(error = %err, "cannot read history, trend uses today only");
                vec![entry]
            }
        };
        let trend = analyze_trend(&history);
        let reports = write_daily_reports(&self.config.reports_dir(), &summary, &trend);

        emit_daily_finished(&date, summary.overall_score, elapsed_secs, trend.trend.as_str());

        DailyOutcome {
            benchmark,
            cognitive,
            summary,
            trend,
            history,
            reports,
        }
    }

    async fn run_mode<S>(&self, mode: RunMode, source: &mut S) -> RunOutcome
    where
        S: AnswerSource + ?Sized,
    {
        let results = prepare_results_file(&self.config.output_dir, mode);
        let outcome = BenchmarkRunner::from_config(mode, &self.config)
            .run(source)
            .await;
        save_outcome(&results, &outcome);
        outcome
    }
}
