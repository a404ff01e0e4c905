//! Daily orchestration against a temporary output directory.

use std::fs;

use chrono::NaiveDate;
use perfbench_core::daily::{HISTORY_FILE, TREND_THRESHOLD};
use perfbench_core::report::{BENCHMARK_RESULTS_FILE, COGNITIVE_RESULTS_FILE};
use perfbench_core::{
    combined_score, BenchConfig, DailyRunner, QuestionBank, SimulatedSource, Trend,
};

fn config(dir: &std::path::Path) -> BenchConfig {
    BenchConfig::default()
        .with_output_dir(dir)
        .with_shuffle(false)
        .with_delay(None)
}

#[tokio::test]
async fn test_daily_run_writes_history_results_and_reports() {
    let dir = tempfile::tempdir().expect("tempdir");
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
    let runner = DailyRunner::new(config(dir.path())).with_date(date);

    let outcome = runner
        .run(&mut SimulatedSource::new(), &mut SimulatedSource::new())
        .await;

    let expected = combined_score(outcome.benchmark.percentage, outcome.cognitive.percentage);
    assert!((outcome.summary.overall_score - expected).abs() < 1e-9);
    assert_eq!(outcome.summary.date, "2024-05-01");

    // Results CSVs: header plus one line per question.
    let bench_csv = fs::read_to_string(dir.path().join(BENCHMARK_RESULTS_FILE)).expect("csv");
    assert_eq!(bench_csv.lines().count(), 21);
    // Cognitive questions carry code with line breaks, so check ids instead
    // of counting lines.
    let cog_csv = fs::read_to_string(dir.path().join(COGNITIVE_RESULTS_FILE)).expect("csv");
    assert_eq!(cog_csv.matches("Evaluation_Reasoning").count(), 1);
    for q in QuestionBank::cognitive().iter() {
        assert!(cog_csv.contains(&format!(",{},", q.id)), "{}", q.id);
    }

    // History: one tab-separated line.
    let history = fs::read_to_string(dir.path().join(HISTORY_FILE)).expect("history");
    let line = history.lines().next().expect("line");
    let columns: Vec<&str> = line.split('\t').collect();
    assert_eq!(columns.len(), 4);
    assert_eq!(columns[0], "2024-05-01");
    assert!(columns[1].ends_with('%'));
    assert!(columns[2].ends_with('s'));

    assert_eq!(outcome.trend.trend, Trend::InsufficientData);
    assert_eq!(outcome.reports.len(), 5);
    let reports = dir.path().join("Reports");
    assert!(reports.join("dashboard-2024-05-01.html").is_file());
    assert!(reports.join("summary-2024-05-01.json").is_file());

    let summary: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(reports.join("summary-2024-05-01.json")).expect("read"),
    )
    .expect("json");
    assert_eq!(summary["date"], "2024-05-01");
    assert!(summary["overallScore"].is_number());
}

#[tokio::test]
async fn test_second_daily_run_computes_trend() {
    let dir = tempfile::tempdir().expect("tempdir");
    // An older, much lower score makes the trend improving.
    fs::write(
        dir.path().join(HISTORY_FILE),
        "2024-04-30\t1.0%\t30s\t08:00:00\n",
    )
    .expect("seed history");

    let runner = DailyRunner::new(config(dir.path()))
        .with_date(NaiveDate::from_ymd_opt(2024, 5, 1).expect("date"));
    let outcome = runner
        .run(&mut SimulatedSource::new(), &mut SimulatedSource::new())
        .await;

    assert_eq!(outcome.history.len(), 2);
    assert_eq!(outcome.trend.data_points, 2);
    let improvement = outcome.trend.improvement.expect("improvement");
    assert!((improvement - (outcome.history[1].score - 1.0)).abs() < 1e-9);
    if improvement > TREND_THRESHOLD {
        assert_eq!(outcome.trend.trend, Trend::Improving);
    }
    assert!(reports_trend_file(dir.path()).contains("\"dataPoints\": 2"));
}

fn reports_trend_file(dir: &std::path::Path) -> String {
    fs::read_to_string(dir.join("Reports").join("trends-2024-05-01.json")).expect("trend file")
}

#[tokio::test]
async fn test_unwritable_output_does_not_abort_daily_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("out");
    fs::write(&blocker, "regular file").expect("write");

    let runner = DailyRunner::new(config(&blocker))
        .with_date(NaiveDate::from_ymd_opt(2024, 5, 1).expect("date"));
    let outcome = runner
        .run(&mut SimulatedSource::new(), &mut SimulatedSource::new())
        .await;

    assert_eq!(outcome.benchmark.records.len(), 20);
    assert_eq!(outcome.cognitive.records.len(), 5);
    assert!(outcome.reports.is_empty());
}
