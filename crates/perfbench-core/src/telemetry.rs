//! Tracing initialisation for the perfbench binary.
//!
//! [`init_tracing`] installs the global subscriber once: an `EnvFilter`, a
//! console layer (plain or JSON), and optionally a JSON layer appending to a
//! dated file under a log directory.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Path of the log file for `date` (`YYYY-MM-DD`) under `dir`.
pub fn log_file_path(dir: &Path, date: &str) -> PathBuf {
    dir.join(format!("perfbench-{}.log", date))
}

fn open_log_file(dir: &Path) -> std::io::Result<File> {
    fs::create_dir_all(dir)?;
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path(dir, &date))
}

/// Initialise the global tracing subscriber.
///
/// * `json`: console output as newline-delimited JSON.
/// * `level`: default verbosity when `RUST_LOG` is not set.
/// * `log_dir`: when given, events are also appended as JSON to
///   `<log_dir>/perfbench-<date>.log`. A file that cannot be opened is
///   reported on stderr and skipped.
///
/// Only the first call in a process takes effect.
pub fn init_tracing(json: bool, level: Level, log_dir: Option<&Path>) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let console = if json {
        fmt::layer().with_target(false).json().boxed()
    } else {
        fmt::layer().with_target(false).boxed()
    };

    let file = log_dir.and_then(|dir| match open_log_file(dir) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .json()
                .with_writer(Mutex::new(file))
                .boxed(),
        ),
        Err(err) => {
            eprintln!("perfbench: cannot open log file in {}: {}", dir.display(), err);
            None
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_path() {
        let path = log_file_path(Path::new("logs"), "2024-03-01");
        assert_eq!(path, Path::new("logs").join("perfbench-2024-03-01.log"));
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("nested").join("logs");
        open_log_file(&nested).expect("open");
        assert!(nested.is_dir());
        assert_eq!(fs::read_dir(&nested).expect("read_dir").count(), 1);
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(false, Level::INFO, None);
        init_tracing(true, Level::DEBUG, None);
    }
}
