//! Process-wide counters for generator traffic and scoring.
//!
//! Counters are bumped silently at the call site. [`Metrics::flush`] emits
//! the current values as one `info!` event at the end of a command.

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

/// Atomic counters; no allocation, no locking.
pub struct Metrics {
    api_calls: AtomicU64,
    api_errors: AtomicU64,
    parse_fallbacks: AtomicU64,
    questions_scored: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub api_calls: u64,
    pub api_errors: u64,
    pub parse_fallbacks: u64,
    pub questions_scored: u64,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            api_calls: AtomicU64::new(0),
            api_errors: AtomicU64::new(0),
            parse_fallbacks: AtomicU64::new(0),
            questions_scored: AtomicU64::new(0),
        }
    }

    pub fn inc_api_calls(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "api_calls", "counter incremented");
    }

    pub fn inc_api_errors(&self) {
        self.api_errors.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "api_errors", "counter incremented");
    }

    /// A batched reply needed the blank-line splitter.
    pub fn inc_parse_fallbacks(&self) {
        self.parse_fallbacks.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "parse_fallbacks", "counter incremented");
    }

    pub fn inc_questions_scored(&self) {
        self.questions_scored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            api_calls: self.api_calls.load(Ordering::Relaxed),
            api_errors: self.api_errors.load(Ordering::Relaxed),
            parse_fallbacks: self.parse_fallbacks.load(Ordering::Relaxed),
            questions_scored: self.questions_scored.load(Ordering::Relaxed),
        }
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        let s = self.snapshot();
        tracing::info!(
            metric = "flush",
            api_calls = s.api_calls,
            api_errors = s.api_errors,
            parse_fallbacks = s.parse_fallbacks,
            questions_scored = s.questions_scored,
        );
    }

    pub fn reset(&self) {
        self.api_calls.store(0, Ordering::Relaxed);
        self.api_errors.store(0, Ordering::Relaxed);
        self.parse_fallbacks.store(0, Ordering::Relaxed);
        self.questions_scored.store(0, Ordering::Relaxed);
    }
}
