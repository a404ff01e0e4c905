//! Offline source that answers from a table of canned replies.

use std::collections::HashMap;
use std::ops::Range;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{Answer, AnswerSource};
use crate::domain::Question;

/// Reply used for any question without a canned answer.
pub const GENERIC_RESPONSE: &str = "This is a simulated AI response that demonstrates understanding \
of the key concepts and provides a technically accurate solution.";

const CANNED: &[(&str, &str)] = &[
    ("sql_join_complex", "SELECT c.id, c.name, COUNT(o.id) as order_count, SUM(o.total_amount) as total_value FROM customers c JOIN orders o ON c.id = o.customer_id WHERE o.order_date >= DATE_SUB(CURDATE(), INTERVAL 6 MONTH) GROUP BY c.id, c.name HAVING COUNT(o.id) > 3;"),
    ("sql_window_function", "WITH RankedEmployees AS (SELECT id, name, department_id, salary, RANK() OVER (PARTITION BY department_id ORDER BY salary DESC) as salary_rank FROM employees) SELECT * FROM RankedEmployees WHERE salary_rank <= 2;"),
    ("sql_subquery_optimization", "SELECT p.* FROM products p INNER JOIN categories c ON p.category_id = c.id WHERE c.name IN ('Electronics', 'Computers'); -- JOIN is more efficient than subquery"),
    ("sql_pivot_data", "SELECT product_category, SUM(CASE WHEN month = 'Jan' THEN amount ELSE 0 END) as January, SUM(CASE WHEN month = 'Feb' THEN amount ELSE 0 END) as February, SUM(CASE WHEN month = 'Mar' THEN amount ELSE 0 END) as March FROM sales GROUP BY product_category;"),
    ("bug_memory_leak", "The issue is with variable hoisting and closure. The var i is hoisted and shared across all functions. When the handlers execute, i will be equal to items.length. Fix: use let instead of var, or create proper closure."),
    ("bug_race_condition", "Race condition occurs when multiple async calls read the same value simultaneously. Use atomic operations or database-level incrementing like UPDATE counter SET count = count + 1."),
    ("bug_null_pointer", "NullPointerException risk if getName() returns null. Need null check: if (user.getName() != null) { String name = user.getName().trim(); ... }"),
    ("bug_buffer_overflow", "Buffer overflow vulnerability with gets(). Use fgets(buffer, sizeof(buffer), stdin) to prevent buffer overrun attacks."),
    ("code_binary_search", "mid = Math.floor((left + right) / 2); left = mid + 1; right = mid - 1;"),
    ("code_promise_chain", "return fetchProfile(user.profileId); return processProfile(profile); console.error('Chain error:', error);"),
    ("code_recursive_factorial", "if (n <= 1) return 1; if (memo[n]) return memo[n]; return memo[n] = n * factorial(n - 1);"),
    ("code_regex_validation", "const emailRegex = /^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\\.[a-zA-Z]{2,}$/; return emailRegex.test(email);"),
    ("algo_two_sum", "Use hash map for O(n): const map = new Map(); for (let i = 0; i < nums.length; i++) { const complement = target - nums[i]; if (map.has(complement)) return [map.get(complement), i]; map.set(nums[i], i); }"),
    ("algo_palindrome_check", "Use two pointers: find middle with slow/fast pointers, reverse second half, compare halves, then restore original structure for O(1) space complexity."),
    ("algo_merge_intervals", "Sort by start time, then merge overlapping intervals: [[1,3],[2,6]] becomes [1,6]. Result: [[1,6],[8,10],[15,18]]"),
    ("algo_lru_cache", "HashMap + Doubly Linked List: HashMap for O(1) access, DLL for O(1) insertion/deletion. Move accessed items to head, remove from tail when at capacity."),
    ("api_rest_design", "GET /posts, POST /posts, GET /posts/:id, PUT /posts/:id, DELETE /posts/:id, GET /posts/:id/comments, POST /posts/:id/comments with appropriate status codes 200, 201, 404, 204"),
    ("api_error_handling", "Rate limiting: Token bucket algorithm. Retries: Exponential backoff with jitter. Circuit breaker: Monitor failure rates, open after threshold, half-open for recovery testing."),
    ("api_authentication", "JWT for stateless microservices auth, OAuth 2.0 for third-party user delegation, API Keys for simple service-to-service authentication. Each serves different security models."),
    ("api_graphql_optimization", "Use DataLoader pattern to batch requests: const userLoader = new DataLoader(ids => User.findByIds(ids)); In resolver: return userLoader.load(userId); This prevents N+1 queries."),
    ("logic_puzzle", "Let me work through this systematically. If Carol is 3 floors above Bob, and Alice is 2 floors above Bob, then Carol is 1 floor above Alice. Testing possibilities: If Carol=4, then Bob=1, Alice=3 - but Dan is already on 3. If Carol=3, conflicts with Dan. If Carol=2, then Bob=-1 (impossible). This puzzle appears to have no valid solution due to logical contradictions."),
    ("bayes_theorem", "This is a classic base rate fallacy example. Using Bayes' theorem: P(Disease|Positive) = (0.95 × 0.01) / [(0.95 × 0.01) + (0.05 × 0.99)] = 0.0095 / 0.059 ≈ 0.161 = 16.1%"),
    ("python_gotcha", "This demonstrates the mutable default argument trap in Python. The default [] is created once and shared between all method calls. First call: step becomes [1], returns 1. Second call: step becomes [1,1], returns 2. Third call: step becomes [1,1,1], returns 3. Output: 1, 2, 3"),
    ("logical_fallacy", "This commits the logical fallacy of 'affirming the consequent.' The argument structure is: If P then Q, Q is true, therefore P is true. This is invalid reasoning. The premise only establishes that success implies long hours, not that long hours imply success. Many people work long hours without being successful programmers."),
    ("integer_overflow", "This causes integer overflow. 2147483647 is the maximum value for a 32-bit signed integer (2^31 - 1). Adding 1 exceeds this limit. In C, this is technically undefined behavior, but on most modern systems using two's complement representation, it wraps around to the minimum value: -2147483648."),
];

/// Answers from a fixed table, optionally after a random "thinking" pause.
///
/// The pause is included in the runner's wall-clock measurement, so it
/// drives the speed bonus the same way a slow API would.
#[derive(Debug)]
pub struct SimulatedSource {
    responses: HashMap<String, String>,
    fallback: String,
    delay_ms: Option<Range<u64>>,
    rng: StdRng,
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSource {
    /// Canned answers for both built-in banks, no pause.
    pub fn new() -> Self {
        Self {
            responses: CANNED
                .iter()
                .map(|(id, text)| (id.to_string(), text.to_string()))
                .collect(),
            fallback: GENERIC_RESPONSE.to_string(),
            delay_ms: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Sleep for a uniformly drawn duration in `range` before each answer.
    /// An empty range disables the pause.
    pub fn with_delay(mut self, range: Range<Duration>) -> Self {
        let ms = range.start.as_millis() as u64..range.end.as_millis() as u64;
        self.delay_ms = if ms.is_empty() { None } else { Some(ms) };
        self
    }

    /// Make the pause sequence reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Add or replace the canned answer for `id`.
    pub fn with_response(mut self, id: &str, text: &str) -> Self {
        self.responses.insert(id.to_string(), text.to_string());
        self
    }

    /// Canned answer for `id`, or the generic reply.
    pub fn response_for(&self, id: &str) -> &str {
        self.responses
            .get(id)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    fn next_delay(&mut self) -> Option<Duration> {
        let range = self.delay_ms.clone()?;
        Some(Duration::from_millis(self.rng.gen_range(range)))
    }
}

#[async_trait]
impl AnswerSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn answer(&mut self, _index: usize, question: &Question) -> Answer {
        if let Some(pause) = self.next_delay() {
            debug!(question_id = %question.id, pause_ms = pause.as_millis() as u64, "simulating thinking time");
            tokio::time::sleep(pause).await;
        }
        Answer::new(self.response_for(&question.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::QuestionBank;

    #[test]
    fn test_every_builtin_question_has_a_canned_answer() {
        let source = SimulatedSource::new();
        for bank in [QuestionBank::technical(), QuestionBank::cognitive()] {
            for q in bank.iter() {
                assert_ne!(source.response_for(&q.id), GENERIC_RESPONSE, "{}", q.id);
            }
        }
    }

    #[test]
    fn test_unknown_id_gets_generic_reply() {
        let source = SimulatedSource::new();
        assert_eq!(source.response_for("nope"), GENERIC_RESPONSE);
        let source = source.with_response("nope", "custom");
        assert_eq!(source.response_for("nope"), "custom");
    }

    #[test]
    fn test_empty_delay_range_disables_pause() {
        let mut source = SimulatedSource::new().with_delay(Duration::ZERO..Duration::ZERO);
        assert_eq!(source.next_delay(), None);
    }

    #[test]
    fn test_seeded_delays_repeat_and_stay_in_range() {
        let range = Duration::from_millis(1000)..Duration::from_millis(5000);
        let mut a = SimulatedSource::new().with_delay(range.clone()).with_seed(7);
        let mut b = SimulatedSource::new().with_delay(range.clone()).with_seed(7);
        for _ in 0..10 {
            let delay = a.next_delay().expect("delay");
            assert_eq!(Some(delay), b.next_delay());
            assert!(range.contains(&delay));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_sleeps_for_pause() {
        let q = QuestionBank::technical().questions()[0].clone();
        let mut source = SimulatedSource::new()
            .with_delay(Duration::from_millis(1000)..Duration::from_millis(1001))
            .with_seed(1);

        let started = tokio::time::Instant::now();
        let answer = source.answer(0, &q).await;
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert!(answer.text.starts_with("SELECT"));
        assert_eq!(answer.reported_elapsed, None);
    }
}
