//! Cognitive benchmark: logic puzzles, statistics and language gotchas.

use super::COGNITIVE_POINTS;
use crate::domain::{Category, Question};

pub(super) fn questions() -> Vec<Question> {
    vec![
        Question::new(
            "logic_puzzle",
            Category::LogicReasoning,
            "In a 5-story building, Alice lives 2 floors above Bob, who lives 3 floors below Carol. Dan lives on floor 3. If Carol doesn't live on floor 5, what floor does Alice live on?",
            "This puzzle contains a logical contradiction and has no valid solution.",
            COGNITIVE_POINTS,
        ),
        Question::new(
            "bayes_theorem",
            Category::StatisticalReasoning,
            "A medical test is 95% accurate. 1% of population has the disease. If you test positive, what's the probability you actually have the disease?",
            "16.1%. Using Bayes' theorem: P(Disease|Positive) ≈ 0.161 = 16.1%",
            COGNITIVE_POINTS,
        ),
        Question::new(
            "python_gotcha",
            Category::ProgrammingEdgeCases,
            "What's the output of this Python code?\nclass Counter:\n    def increment(self, step=[]):\n        step.append(1)\n        return len(step)",
            "Output: 1, 2, 3. The mutable default argument [] is shared between all instances.",
            COGNITIVE_POINTS,
        ),
        Question::new(
            "logical_fallacy",
            Category::LogicReasoning,
            "What's wrong with: 'All successful programmers work long hours. Sarah works long hours. Therefore, Sarah is a successful programmer.'?",
            "This is the logical fallacy of 'affirming the consequent.' Invalid reasoning structure.",
            COGNITIVE_POINTS,
        ),
        Question::new(
            "integer_overflow",
            Category::ProgrammingEdgeCases,
            "What happens with this C code?\nint x = 2147483647;\nx = x + 1;\nprintf(\"%d\", x);",
            "Integer overflow occurs. Typically wraps to -2147483648 on two's complement systems.",
            COGNITIVE_POINTS,
        ),
    ]
}
