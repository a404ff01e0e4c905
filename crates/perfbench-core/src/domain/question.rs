//! Question records and categories.

use serde::{Deserialize, Serialize};

/// Closed set of question categories.
///
/// Serialised with the identifiers used in result files
/// (`SQL_Database`, `Logic_Reasoning`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "SQL_Database")]
    SqlDatabase,
    #[serde(rename = "Bug_Identification")]
    BugIdentification,
    #[serde(rename = "Code_Completion")]
    CodeCompletion,
    #[serde(rename = "Logic_Algorithm")]
    LogicAlgorithm,
    #[serde(rename = "API_Integration")]
    ApiIntegration,
    #[serde(rename = "Logic_Reasoning")]
    LogicReasoning,
    #[serde(rename = "Statistical_Reasoning")]
    StatisticalReasoning,
    #[serde(rename = "Programming_Edge_Cases")]
    ProgrammingEdgeCases,
}

impl Category {
    /// Identifier as written to CSV and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SqlDatabase => "SQL_Database",
            Self::BugIdentification => "Bug_Identification",
            Self::CodeCompletion => "Code_Completion",
            Self::LogicAlgorithm => "Logic_Algorithm",
            Self::ApiIntegration => "API_Integration",
            Self::LogicReasoning => "Logic_Reasoning",
            Self::StatisticalReasoning => "Statistical_Reasoning",
            Self::ProgrammingEdgeCases => "Programming_Edge_Cases",
        }
    }

    /// Human-readable name for console output.
    pub fn display_name(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single benchmark item. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within a bank.
    pub id: String,
    pub category: Category,
    /// Prompt text sent to the model.
    pub question: String,
    /// Reference answer the reply is scored against.
    pub correct_answer: String,
    /// Maximum points this question can earn.
    pub points: u32,
}

impl Question {
    pub fn new(
        id: &str,
        category: Category,
        question: &str,
        correct_answer: &str,
        points: u32,
    ) -> Self {
        Self {
            id: id.to_string(),
            category,
            question: question.to_string(),
            correct_answer: correct_answer.to_string(),
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_uses_result_identifiers() {
        let json = serde_json::to_string(&Category::ApiIntegration).expect("serialize");
        assert_eq!(json, "\"API_Integration\"");

        let back: Category = serde_json::from_str("\"Programming_Edge_Cases\"").expect("deserialize");
        assert_eq!(back, Category::ProgrammingEdgeCases);
    }

    #[test]
    fn test_category_display_name() {
        assert_eq!(Category::SqlDatabase.display_name(), "SQL Database");
        assert_eq!(
            Category::ProgrammingEdgeCases.display_name(),
            "Programming Edge Cases"
        );
        assert_eq!(Category::LogicAlgorithm.to_string(), "Logic_Algorithm");
    }

    #[test]
    fn test_question_new() {
        let q = Question::new("q1", Category::CodeCompletion, "Complete it", "Done", 12);
        assert_eq!(q.id, "q1");
        assert_eq!(q.points, 12);
        assert_eq!(q.category, Category::CodeCompletion);
    }
}
