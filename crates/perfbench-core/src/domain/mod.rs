//! Domain models for perfbench.
//!
//! Canonical definitions for the core entities:
//! - `Question`: immutable benchmark item
//! - `EvaluationResult`: scorer output for one answer
//! - `RunRecord`: persisted row for one scored question
//! - `CategoryAggregate`: running per-category totals

pub mod error;
pub mod question;
pub mod record;

pub use error::{BenchError, Result};
pub use question::{Category, Question};
pub use record::{truncate_chars, CategoryAggregate, EvaluationResult, RunRecord, TruncationWidths};
