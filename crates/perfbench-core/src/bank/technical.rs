//! Technical benchmark: SQL, bug hunting, code completion, algorithms, APIs.

use super::TECHNICAL_POINTS;
use crate::domain::{Category, Question};

pub(super) fn questions() -> Vec<Question> {
    vec![
        // SQL Database
        Question::new(
            "sql_join_complex",
            Category::SqlDatabase,
            "Write a SQL query to find all customers who have made more than 3 orders in the last 6 months, along with their total order value. Use tables: customers(id, name), orders(id, customer_id, order_date, total_amount).",
            "SELECT c.id, c.name, COUNT(o.id) as order_count, SUM(o.total_amount) as total_value FROM customers c JOIN orders o ON c.id = o.customer_id WHERE o.order_date >= DATE_SUB(NOW(), INTERVAL 6 MONTH) GROUP BY c.id, c.name HAVING COUNT(o.id) > 3;",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "sql_window_function",
            Category::SqlDatabase,
            "Create a query to rank employees by salary within each department and show only the top 2 highest paid employees per department. Use table: employees(id, name, department_id, salary).",
            "SELECT id, name, department_id, salary, rank FROM (SELECT id, name, department_id, salary, RANK() OVER (PARTITION BY department_id ORDER BY salary DESC) as rank FROM employees) ranked WHERE rank <= 2;",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "sql_subquery_optimization",
            Category::SqlDatabase,
            "Optimize this query: SELECT * FROM products WHERE category_id IN (SELECT id FROM categories WHERE name = 'Electronics' OR name = 'Computers');",
            "SELECT p.* FROM products p JOIN categories c ON p.category_id = c.id WHERE c.name IN ('Electronics', 'Computers'); -- Using JOIN instead of subquery for better performance",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "sql_pivot_data",
            Category::SqlDatabase,
            "Write a query to pivot monthly sales data showing months as columns. Table: sales(month, product_category, amount). Show product categories as rows and months as columns with total amounts.",
            "SELECT product_category, SUM(CASE WHEN month = 'Jan' THEN amount ELSE 0 END) as Jan, SUM(CASE WHEN month = 'Feb' THEN amount ELSE 0 END) as Feb, SUM(CASE WHEN month = 'Mar' THEN amount ELSE 0 END) as Mar FROM sales GROUP BY product_category;",
            TECHNICAL_POINTS,
        ),
        // Bug Identification
        Question::new(
            "bug_memory_leak",
            Category::BugIdentification,
            "Find the bug in this JavaScript code: ```function createHandlers(items) { const handlers = []; for (var i = 0; i < items.length; i++) { handlers.push(function() { console.log('Item:', items[i]); }); } return handlers; }```",
            "The bug is closure variable capture. The variable 'i' is shared across all functions, so when called, all handlers will log 'Item: undefined' because i equals items.length. Fix: use 'let i' instead of 'var i' or create a closure: handlers.push((function(index) { return function() { console.log('Item:', items[index]); }; })(i));",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "bug_race_condition",
            Category::BugIdentification,
            "Identify the concurrency bug: ```async function updateCounter() { const current = await getCurrentCount(); const newCount = current + 1; await saveCount(newCount); }``` Multiple calls to updateCounter() run simultaneously.",
            "Race condition bug. Multiple simultaneous calls can read the same 'current' value before any saves it, causing lost updates. Fix: Use atomic operations, database transactions, or locking mechanisms. Example: UPDATE counter SET count = count + 1 WHERE id = ?; or use mutex/semaphore.",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "bug_null_pointer",
            Category::BugIdentification,
            "Find the potential bug: ```public String processUser(User user) { String name = user.getName().trim(); if (name.length() > 0) { return name.toUpperCase(); } return 'Anonymous'; }```",
            "Potential NullPointerException. If user.getName() returns null, calling .trim() will throw NPE. Fix: String name = user.getName(); if (name != null) { name = name.trim(); if (name.length() > 0) return name.toUpperCase(); } return 'Anonymous';",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "bug_buffer_overflow",
            Category::BugIdentification,
            "Identify the security vulnerability: ```char buffer[10]; printf('Enter name: '); gets(buffer); printf('Hello %s!', buffer);```",
            "Buffer overflow vulnerability. gets() doesn't check buffer bounds, allowing attackers to overwrite memory and potentially execute arbitrary code. Fix: Use fgets(buffer, sizeof(buffer), stdin) or scanf('%9s', buffer) to limit input size.",
            TECHNICAL_POINTS,
        ),
        // Code Completion
        Question::new(
            "code_binary_search",
            Category::CodeCompletion,
            "Complete this binary search function: ```function binarySearch(arr, target) { let left = 0, right = arr.length - 1; while (left <= right) { let mid = ___; if (arr[mid] === target) return mid; if (arr[mid] < target) ___; else ___; } return -1; }```",
            "let mid = Math.floor((left + right) / 2); if (arr[mid] < target) left = mid + 1; else right = mid - 1;",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "code_promise_chain",
            Category::CodeCompletion,
            "Complete the Promise chain: ```fetchUser(id).then(user => { return ___; }).then(profile => { return ___; }).catch(error => { ___; });``` The chain should fetch user, then fetch their profile, then handle errors.",
            "return fetchProfile(user.profileId); }).then(profile => { return processProfile(profile); }).catch(error => { console.error('Error in chain:', error); throw error;",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "code_recursive_factorial",
            Category::CodeCompletion,
            "Complete the recursive factorial function with memoization: ```const memo = {}; function factorial(n) { if (___) return 1; if (___) return memo[n]; return memo[n] = ___; }```",
            "if (n <= 1) return 1; if (memo[n]) return memo[n]; return memo[n] = n * factorial(n - 1);",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "code_regex_validation",
            Category::CodeCompletion,
            "Complete the email validation regex: ```const emailRegex = /^[___]+@[___]+\\.[___]+$/; function isValidEmail(email) { return ___; }```",
            "const emailRegex = /^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\\.[a-zA-Z]{2,}$/; function isValidEmail(email) { return emailRegex.test(email); }",
            TECHNICAL_POINTS,
        ),
        // Logic Algorithm
        Question::new(
            "algo_two_sum",
            Category::LogicAlgorithm,
            "Given an array of integers and a target sum, find two numbers that add up to the target. Return their indices. Optimize for O(n) time complexity.",
            "Use hash map: function twoSum(nums, target) { const map = new Map(); for (let i = 0; i < nums.length; i++) { const complement = target - nums[i]; if (map.has(complement)) return [map.get(complement), i]; map.set(nums[i], i); } return []; }",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "algo_palindrome_check",
            Category::LogicAlgorithm,
            "Design an efficient algorithm to check if a linked list is a palindrome without using extra space proportional to input size.",
            "1) Find middle using slow/fast pointers 2) Reverse second half 3) Compare first half with reversed second half 4) Restore list. Code: Use two pointers, reverse in-place, compare, then restore original structure.",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "algo_merge_intervals",
            Category::LogicAlgorithm,
            "Given intervals [[1,3],[2,6],[8,10],[15,18]], merge overlapping intervals. What's the algorithm and result?",
            "1) Sort by start time 2) Iterate and merge overlapping intervals. Result: [[1,6],[8,10],[15,18]]. Algorithm: for each interval, if it overlaps with previous merged interval, extend the end time; otherwise add new interval.",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "algo_lru_cache",
            Category::LogicAlgorithm,
            "Design an LRU (Least Recently Used) cache with O(1) get and put operations. What data structures would you use?",
            "Use HashMap + Doubly Linked List. HashMap stores key->node mapping for O(1) access. Doubly linked list maintains order (head=most recent, tail=least recent). On access: move to head. On capacity exceed: remove tail.",
            TECHNICAL_POINTS,
        ),
        // API Integration
        Question::new(
            "api_rest_design",
            Category::ApiIntegration,
            "Design RESTful API endpoints for a blog system with posts, comments, and users. Include proper HTTP methods and status codes.",
            "GET /posts (200), POST /posts (201), GET /posts/:id (200/404), PUT /posts/:id (200/404), DELETE /posts/:id (204/404), GET /posts/:id/comments (200), POST /posts/:id/comments (201), GET /users/:id (200/404), POST /users (201)",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "api_error_handling",
            Category::ApiIntegration,
            "How would you handle API rate limiting, retries, and circuit breaker pattern in a microservices architecture?",
            "Rate limiting: Token bucket algorithm, Redis counters. Retries: Exponential backoff with jitter. Circuit breaker: Monitor failure rates, open circuit after threshold, half-open for testing, close when healthy. Use libraries like Hystrix or Resilience4j.",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "api_authentication",
            Category::ApiIntegration,
            "Compare JWT vs OAuth 2.0 vs API Keys for different API security scenarios. When would you use each?",
            "JWT: Stateless auth, microservices, short-lived tokens with refresh. OAuth 2.0: Third-party access, user consent, social login. API Keys: Simple service-to-service, internal APIs, rate limiting. JWT for distributed systems, OAuth for user delegation, API keys for service auth.",
            TECHNICAL_POINTS,
        ),
        Question::new(
            "api_graphql_optimization",
            Category::ApiIntegration,
            "How do you solve the N+1 query problem in GraphQL? Provide a solution with data loaders.",
            "Use DataLoader pattern: Batch multiple requests in single tick, deduplicate keys, cache results. Example: const userLoader = new DataLoader(ids => User.findByIds(ids)); In resolver: return userLoader.load(userId); This batches database queries instead of making N separate calls.",
            TECHNICAL_POINTS,
        ),
    ]
}
