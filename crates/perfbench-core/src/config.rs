//! Run configuration.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{BenchError, Result};

pub const OUTPUT_DIR_ENV: &str = "PERFBENCH_OUTPUT_DIR";

/// Default simulated thinking pause: 1 to 5 seconds.
pub const DEFAULT_DELAY: Range<Duration> = Duration::from_millis(1000)..Duration::from_millis(5000);

/// Directory under the output directory that receives daily reports.
pub const REPORTS_DIR: &str = "Reports";

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Root for result CSVs, the daily history log and `Reports/`.
    pub output_dir: PathBuf,
    /// Randomise question order before each run.
    pub shuffle: bool,
    /// Seed for the shuffle and the simulated pause, for reproducible runs.
    pub seed: Option<u64>,
    /// Simulated thinking pause; `None` answers immediately.
    pub delay: Option<Range<Duration>>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            shuffle: true,
            seed: None,
            delay: Some(DEFAULT_DELAY),
        }
    }
}

impl BenchConfig {
    /// Defaults, with the output directory taken from `PERFBENCH_OUTPUT_DIR`
    /// when set and non-empty.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var(OUTPUT_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.output_dir = PathBuf::from(dir.trim());
            }
        }
        config
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
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

    pub fn with_delay(mut self, delay: Option<Range<Duration>>) -> Self {
        self.delay = delay;
        self
    }

    /// Reject an inverted delay range or an empty output path.
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(BenchError::InvalidConfig(
                "output directory must not be empty".to_string(),
            ));
        }
        if let Some(delay) = &self.delay {
            if delay.start > delay.end {
                return Err(BenchError::InvalidConfig(format!(
                    "delay range is inverted: {}ms..{}ms",
                    delay.start.as_millis(),
                    delay.end.as_millis()
                )));
            }
        }
        Ok(())
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.output_dir.join(REPORTS_DIR)
    }

    pub fn output_path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.output_dir.join(file_name)
    }
}
