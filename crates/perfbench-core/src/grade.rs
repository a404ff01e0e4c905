//! Grade labels derived from a run percentage.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete performance grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Grade {
    NeedsImprovement,
    Fair,
    Good,
    VeryGood,
    Excellent,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Excellent => "EXCELLENT",
            Grade::VeryGood => "VERY_GOOD",
            Grade::Good => "GOOD",
            Grade::Fair => "FAIR",
            Grade::NeedsImprovement => "NEEDS_IMPROVEMENT",
        }
    }

    /// Label with the underscore replaced, for human-facing output.
    pub fn display_name(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold table used to grade a run.
///
/// Both scales use 90/80/70; the benchmark scale adds a FAIR tier at 60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeScale {
    Benchmark,
    Cognitive,
}

impl GradeScale {
    pub fn grade(self, percentage: f64) -> Grade {
        if percentage >= 90.0 {
            Grade::Excellent
        } else if percentage >= 80.0 {
            Grade::VeryGood
        } else if percentage >= 70.0 {
            Grade::Good
        } else if percentage >= 60.0 && self == GradeScale::Benchmark {
            Grade::Fair
        } else {
            Grade::NeedsImprovement
        }
    }

    /// One-line assessment that accompanies `grade` on this scale.
    pub fn message(self, grade: Grade) -> &'static str {
        match (self, grade) {
            (GradeScale::Benchmark, Grade::Excellent) => "Outstanding AI performance across all domains",
            (GradeScale::Benchmark, Grade::VeryGood) => "Strong performance with minor improvement areas",
            (GradeScale::Benchmark, Grade::Good) => "Solid baseline with some gaps to address",
            (GradeScale::Benchmark, Grade::Fair) => "Needs focused improvement in several areas",
            (GradeScale::Benchmark, Grade::NeedsImprovement) => "Significant gaps requiring attention",
            (GradeScale::Cognitive, Grade::Excellent) => "Strong reasoning across all domains",
            (GradeScale::Cognitive, Grade::VeryGood) => "Minor areas for improvement",
            (GradeScale::Cognitive, Grade::Good | Grade::Fair) => "Some reasoning gaps detected",
            (GradeScale::Cognitive, Grade::NeedsImprovement) => "Recommend focused training",
        }
    }
}
