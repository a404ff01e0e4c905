//! Results CSV files.
//!
//! Each mode appends to its own CSV under the output directory. The header
//! is written only when the file is created, so results from many runs
//! accumulate in one file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::RunRecord;
use crate::obs::{emit_report_write_failed, emit_report_written};
use crate::runner::{RunMode, RunOutcome};

pub const BENCHMARK_RESULTS_FILE: &str = "benchmark_results.csv";
pub const COGNITIVE_RESULTS_FILE: &str = "automated_ai_test_results.csv";

const BENCHMARK_HEADER: &[&str] = &[
    "Timestamp",
    "Test_ID",
    "Category",
    "Question",
    "AI_Response",
    "Correct_Answer",
    "Accuracy_Score",
    "Time_Score",
    "Total_Score",
    "Response_Time_Ms",
];

const COGNITIVE_HEADER: &[&str] = &[
    "Timestamp",
    "Test_ID",
    "Category",
    "Question",
    "AI_Response",
    "Correct_Answer",
    "Score",
    "Evaluation_Reasoning",
];

/// Column names for `mode`'s results file.
pub fn header(mode: RunMode) -> &'static [&'static str] {
    match mode {
        RunMode::Benchmark => BENCHMARK_HEADER,
        RunMode::Cognitive => COGNITIVE_HEADER,
    }
}

/// One CSV line (without the line terminator) for `record`.
pub fn csv_row(mode: RunMode, record: &RunRecord) -> String {
    let mut fields = vec![
        record.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        record.test_id.clone(),
        record.category.as_str().to_string(),
        record.question.clone(),
        record.candidate_response.clone(),
        record.correct_answer.clone(),
    ];
    match mode {
        RunMode::Benchmark => fields.extend([
            record.accuracy_score.to_string(),
            record.time_score.to_string(),
            record.total_score.to_string(),
            record.response_time_ms.to_string(),
        ]),
        RunMode::Cognitive => fields.extend([
            record.total_score.to_string(),
            record.reasoning.clone(),
        ]),
    }
    fields
        .iter()
        .map(|f| escape_csv(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quote a field when it contains a comma, quote or line break.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Append-only results CSV for one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsFile {
    path: PathBuf,
    mode: RunMode,
}

impl ResultsFile {
    pub fn new(output_dir: &Path, mode: RunMode) -> Self {
        let name = match mode {
            RunMode::Benchmark => BENCHMARK_RESULTS_FILE,
            RunMode::Cognitive => COGNITIVE_RESULTS_FILE,
        };
        Self {
            path: output_dir.join(name),
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with its header if it does not exist yet.
    ///
    /// Returns `true` when the file was created.
    pub fn init(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        let mut line = header(self.mode).join(",");
        line.push('\n');
        fs::write(&self.path, line).with_context(|| format!("write {}", self.path.display()))?;
        Ok(true)
    }

    /// Append `records`, creating the file first when needed.
    pub fn append(&self, records: &[RunRecord]) -> Result<()> {
        self.init()?;
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;

        let mut buf = String::new();
        for record in records {
            buf.push_str(&csv_row(self.mode, record));
            buf.push('\n');
        }
        file.write_all(buf.as_bytes())
            .with_context(|| format!("append to {}", self.path.display()))?;
        Ok(())
    }
}

/// Create `mode`'s results file ahead of a run.
///
/// A failure is logged and the run goes ahead; the append after the run
/// retries the creation.
pub fn prepare_results_file(output_dir: &Path, mode: RunMode) -> ResultsFile {
    let file = ResultsFile::new(output_dir, mode);
    if let Err(err) = file.init() {
        emit_report_write_failed("results_csv", file.path(), &format!("{:#}", err));
    }
    file
}

/// Append the records of `outcome`, logging instead of failing.
///
/// Returns whether the records were written.
pub fn save_outcome(file: &ResultsFile, outcome: &RunOutcome) -> bool {
    match file.append(&outcome.records) {
        Ok(()) => {
            emit_report_written("results_csv", file.path());
            true
        }
        Err(err) => {
            emit_report_write_failed("results_csv", file.path(), &format!("{:#}", err));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, EvaluationResult, Question};

    fn record(mode: RunMode, response: &str) -> RunRecord {
        let q = Question::new(
            "algo_two_sum",
            Category::LogicAlgorithm,
            "Two sum?",
            "Use a hash map",
            12,
        );
        let evaluation = EvaluationResult {
            accuracy_score: 7,
            time_score: 2,
            reasoning: "Very good concept coverage".to_string(),
            ratio: 0.7,
        };
        RunRecord::new(&q, response, &evaluation, 1234, mode.widths())
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_benchmark_row_columns() {
        let row = csv_row(RunMode::Benchmark, &record(RunMode::Benchmark, "map lookup"));
        assert!(row.ends_with(",algo_two_sum,Logic_Algorithm,Two sum?,map lookup,Use a hash map,7,2,9,1234"));
    }

    #[test]
    fn test_cognitive_row_columns() {
        let row = csv_row(RunMode::Cognitive, &record(RunMode::Cognitive, "a, b"));
        assert!(row.ends_with(",\"a, b\",Use a hash map,9,Very good concept coverage"));
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = ResultsFile::new(dir.path(), RunMode::Benchmark);

        assert!(file.init().expect("init"));
        assert!(!file.init().expect("second init"));
        file.append(&[record(RunMode::Benchmark, "x")]).expect("append");
        file.append(&[record(RunMode::Benchmark, "y")]).expect("append");

        let content = fs::read_to_string(file.path()).expect("read");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], BENCHMARK_HEADER.join(","));
        assert_eq!(
            content.matches("Timestamp,Test_ID").count(),
            1,
            "header must not repeat"
        );
    }

    #[test]
    fn test_append_creates_missing_file_and_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("out");
        let file = ResultsFile::new(&nested, RunMode::Cognitive);
        file.append(&[record(RunMode::Cognitive, "z")]).expect("append");

        let content = fs::read_to_string(nested.join(COGNITIVE_RESULTS_FILE)).expect("read");
        assert!(content.starts_with("Timestamp,Test_ID,Category,Question,AI_Response,Correct_Answer,Score,Evaluation_Reasoning\n"));
    }

    #[test]
    fn test_prepare_results_file_tolerates_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("write");

        // The output "directory" is a regular file, so creation fails.
        let file = prepare_results_file(&blocker, RunMode::Benchmark);
        assert!(!file.path().exists());
    }
}
