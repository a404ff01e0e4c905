//! Question banks.
//!
//! A [`QuestionBank`] is an ordered, read-only list of [`Question`]s with
//! unique ids. Two banks ship with the crate: [`QuestionBank::technical`]
//! (20 questions, 12 points each) and [`QuestionBank::cognitive`]
//! (5 reasoning questions, 10 points each).

mod cognitive;
mod technical;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{BenchError, Category, Question, Result};

/// Points per technical question: 10 accuracy + 2 speed.
pub const TECHNICAL_POINTS: u32 = 12;

/// Points per cognitive question: accuracy only.
pub const COGNITIVE_POINTS: u32 = 10;

/// Ordered, immutable collection of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    name: String,
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank, rejecting empty banks and duplicate ids.
    pub fn new(name: &str, questions: Vec<Question>) -> Result<Self> {
        if questions.is_empty() {
            return Err(BenchError::InvalidBank(format!("bank '{}' has no questions", name)));
        }
        let mut seen = HashSet::new();
        for q in &questions {
            if !seen.insert(q.id.as_str()) {
                return Err(BenchError::DuplicateQuestion(q.id.clone()));
            }
        }
        Ok(Self {
            name: name.to_string(),
            questions,
        })
    }

    /// The 20-question technical benchmark.
    pub fn technical() -> Self {
        Self {
            name: "technical".to_string(),
            questions: technical::questions(),
        }
    }

    /// The 5-question cognitive reasoning benchmark.
    pub fn cognitive() -> Self {
        Self {
            name: "cognitive".to_string(),
            questions: cognitive::questions(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Look up a question by id.
    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<Category> {
        let mut out = Vec::new();
        for q in &self.questions {
            if !out.contains(&q.category) {
                out.push(q.category);
            }
        }
        out
    }

    /// Sum of per-question points.
    pub fn max_score(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }

    /// SHA-256 over ids and reference answers, independent of definition order.
    pub fn digest(&self) -> String {
        let mut entries: Vec<&Question> = self.questions.iter().collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));

        let mut hasher = Sha256::new();
        for q in entries {
            hasher.update(q.id.as_bytes());
            hasher.update(b"\0");
            hasher.update(q.correct_answer.as_bytes());
            hasher.update(b"\0");
        }
        hex::encode(hasher.finalize())
    }
}

impl<'a> IntoIterator for &'a QuestionBank {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_technical_bank_shape() {
        let bank = QuestionBank::technical();
        assert_eq!(bank.len(), 20);
        assert_eq!(bank.categories().len(), 5);
        assert_eq!(bank.max_score(), 240);
        for category in bank.categories() {
            let n = bank.iter().filter(|q| q.category == category).count();
            assert_eq!(n, 4, "category {} should have 4 questions", category);
        }
        assert!(bank.iter().all(|q| q.points == TECHNICAL_POINTS));
    }

    #[test]
    fn test_cognitive_bank_shape() {
        let bank = QuestionBank::cognitive();
        assert_eq!(bank.len(), 5);
        assert_eq!(bank.max_score(), 50);
        assert_eq!(
            bank.categories(),
            vec![
                Category::LogicReasoning,
                Category::StatisticalReasoning,
                Category::ProgrammingEdgeCases
            ]
        );
    }

    #[test]
    fn test_builtin_ids_unique() {
        for bank in [QuestionBank::technical(), QuestionBank::cognitive()] {
            let rebuilt = QuestionBank::new(bank.name(), bank.questions().to_vec());
            assert!(rebuilt.is_ok(), "bank {} has duplicate ids", bank.name());
        }
    }

    #[test]
    fn test_get_by_id() {
        let bank = QuestionBank::technical();
        let q = bank.get("algo_two_sum").expect("two sum present");
        assert_eq!(q.category, Category::LogicAlgorithm);
        assert!(bank.get("missing").is_none());
    }

    #[test]
    fn test_new_rejects_duplicates_and_empty() {
        let q = Question::new("dup", Category::CodeCompletion, "q", "a", 10);
        let err = QuestionBank::new("x", vec![q.clone(), q]).unwrap_err();
        assert!(matches!(err, BenchError::DuplicateQuestion(id) if id == "dup"));

        let err = QuestionBank::new("empty", vec![]).unwrap_err();
        assert!(matches!(err, BenchError::InvalidBank(_)));
    }

    #[test]
    fn test_digest_is_order_independent() {
        let a = Question::new("a", Category::CodeCompletion, "qa", "answer a", 10);
        let b = Question::new("b", Category::CodeCompletion, "qb", "answer b", 10);
        let ab = QuestionBank::new("x", vec![a.clone(), b.clone()]).expect("bank");
        let ba = QuestionBank::new("x", vec![b, a]).expect("bank");
        assert_eq!(ab.digest(), ba.digest());
        assert_eq!(ab.digest().len(), 64);
        assert_ne!(ab.digest(), QuestionBank::technical().digest());
    }
}
