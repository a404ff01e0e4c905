//! Lexical-overlap scoring.
//!
//! A candidate answer is compared to the reference answer token by token:
//! every qualifying reference token counts as matched when some candidate
//! token contains it, is contained in it, or is related to it through the
//! profile's [`SynonymTable`]. The matched fraction is then mapped to a
//! 0..=10 accuracy score by the profile's [`ScoreScale`].
//!
//! The heuristic is intentionally approximate; it rewards vocabulary
//! overlap, not correctness.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::EvaluationResult;

/// Highest accuracy score either scale produces.
pub const MAX_ACCURACY: u32 = 10;

/// Prefix of the answer substituted for a failed API call.
pub const API_ERROR_PREFIX: &str = "[API Error:";

/// Prefix of the answer substituted for a batched reply gap.
pub const PARSE_ERROR_PREFIX: &str = "[Parse Error:";

// ---------------------------------------------------------------------------
// Tokenization
// ---------------------------------------------------------------------------

/// Lowercase `text`, split it on non-word characters and keep tokens of at
/// least `min_len` characters.
pub fn tokenize(text: &str, min_len: usize) -> Vec<String> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= min_len)
        .map(|t| t.to_ascii_lowercase())
        .collect()
}

/// Whether `text` is one of the sentinel strings answer sources substitute
/// for a failed call or a missing batched answer.
pub fn is_failure_marker(text: &str) -> bool {
    let text = text.trim_start();
    text.starts_with(API_ERROR_PREFIX) || text.starts_with(PARSE_ERROR_PREFIX)
}

// ---------------------------------------------------------------------------
// SynonymTable
// ---------------------------------------------------------------------------

/// Symmetric relatedness lookup between lowercase tokens.
///
/// Relations are stored in both directions, so `related(a, b)` equals
/// `related(b, a)`. A token is never related to itself through the table;
/// identical tokens already match by substring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymTable {
    relations: BTreeMap<String, BTreeSet<String>>,
}

impl SynonymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table where every member of a group is related to every other member.
    pub fn from_groups<G, S>(groups: impl IntoIterator<Item = G>) -> Self
    where
        G: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for group in groups {
            let members: Vec<String> = group
                .into_iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .collect();
            for (i, a) in members.iter().enumerate() {
                for b in &members[i + 1..] {
                    table.insert(a, b);
                }
            }
        }
        table
    }

    /// Table where each key is related to each of its values, and values
    /// sharing a key are not related to each other.
    pub fn from_relations<K, V, S>(relations: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (key, values) in relations {
            for value in values {
                table.insert(key.as_ref(), value.as_ref());
            }
        }
        table
    }

    /// The eight programming synonym groups used by the technical bank.
    pub fn technical() -> Self {
        Self::from_groups([
            ["function", "method", "procedure"],
            ["variable", "parameter", "argument"],
            ["array", "list", "collection"],
            ["object", "instance", "entity"],
            ["database", "table", "relation"],
            ["query", "select", "search"],
            ["error", "exception", "bug"],
            ["algorithm", "solution", "approach"],
        ])
    }

    /// Reasoning relations used by the cognitive bank.
    pub fn cognitive() -> Self {
        Self::from_relations([
            ("contradiction", vec!["impossible", "invalid", "paradox", "conflict"]),
            ("probability", vec!["chance", "likelihood", "bayes"]),
            ("overflow", vec!["exceed", "maximum", "limit", "wrap"]),
            ("fallacy", vec!["error", "invalid", "wrong", "logical"]),
            ("mutable", vec!["shared", "default", "argument"]),
        ])
    }

    /// Relate `a` and `b`. Self-relations are ignored.
    pub fn insert(&mut self, a: &str, b: &str) {
        let a = a.to_ascii_lowercase();
        let b = b.to_ascii_lowercase();
        if a == b {
            return;
        }
        self.relations.entry(a.clone()).or_default().insert(b.clone());
        self.relations.entry(b).or_default().insert(a);
    }

    pub fn related(&self, a: &str, b: &str) -> bool {
        self.relations
            .get(a)
            .map(|set| set.contains(b))
            .unwrap_or(false)
    }

    /// Tokens related to `token`, in lexical order.
    pub fn related_to(&self, token: &str) -> impl Iterator<Item = &str> {
        self.relations
            .get(token)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Number of tokens that have at least one relation.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Scales and profiles
// ---------------------------------------------------------------------------

/// Mapping from match ratio to accuracy points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
    /// `round(ratio * 10)`.
    Linear,
    /// Five fixed bands: 10, 8, 6, 4 and a floor of 2.
    Banded,
}

const BANDS: [(f64, u32, &str); 4] = [
    (0.80, 10, "Excellent - captures all key concepts accurately"),
    (0.65, 8, "Very good - covers most important points"),
    (0.50, 6, "Good - gets main idea with some gaps"),
    (0.35, 4, "Partial understanding present"),
];
const BAND_FLOOR: (u32, &str) = (2, "Limited understanding, significant gaps");

const NO_ANSWER: &str = "No usable answer";

impl ScoreScale {
    /// Accuracy points and label for a ratio in `0.0..=1.0`.
    pub fn apply(self, ratio: f64) -> (u32, &'static str) {
        match self {
            ScoreScale::Linear => {
                let score = ((ratio * 10.0).round() as u32).min(MAX_ACCURACY);
                (score, linear_label(score))
            }
            ScoreScale::Banded => BANDS
                .iter()
                .find(|(threshold, _, _)| ratio >= *threshold)
                .map(|(_, score, label)| (*score, *label))
                .unwrap_or(BAND_FLOOR),
        }
    }
}

fn linear_label(score: u32) -> &'static str {
    match score {
        0..=2 => "Limited coverage",
        3..=4 => "Partial coverage",
        5..=6 => "Good coverage with some gaps",
        7..=8 => "Very good concept coverage",
        _ => "Excellent concept coverage",
    }
}

/// Everything that varies between the technical and cognitive scorers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringProfile {
    /// Tokens shorter than this are ignored on both sides.
    pub min_token_len: usize,
    pub synonyms: SynonymTable,
    pub scale: ScoreScale,
}

impl ScoringProfile {
    pub fn technical() -> Self {
        Self {
            min_token_len: 3,
            synonyms: SynonymTable::technical(),
            scale: ScoreScale::Linear,
        }
    }

    pub fn cognitive() -> Self {
        Self {
            min_token_len: 4,
            synonyms: SynonymTable::cognitive(),
            scale: ScoreScale::Banded,
        }
    }
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// Accuracy half of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    pub score: u32,
    pub ratio: f64,
    /// Reference tokens that found a counterpart.
    pub matched: usize,
    /// Qualifying reference tokens.
    pub considered: usize,
    pub reasoning: String,
}

impl Accuracy {
    fn none(considered: usize) -> Self {
        Self {
            score: 0,
            ratio: 0.0,
            matched: 0,
            considered,
            reasoning: NO_ANSWER.to_string(),
        }
    }
}

/// Scores candidate answers under one [`ScoringProfile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Scorer {
    profile: ScoringProfile,
}

impl Scorer {
    pub fn new(profile: ScoringProfile) -> Self {
        Self { profile }
    }

    pub fn technical() -> Self {
        Self::new(ScoringProfile::technical())
    }

    pub fn cognitive() -> Self {
        Self::new(ScoringProfile::cognitive())
    }

    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    /// Compare `candidate` to `reference`.
    ///
    /// An empty candidate, a failure marker, or a reference without any
    /// qualifying token scores 0.
    pub fn score(&self, candidate: &str, reference: &str) -> Accuracy {
        let min = self.profile.min_token_len;
        let reference_tokens = tokenize(reference, min);
        let considered = reference_tokens.len();

        if is_failure_marker(candidate) {
            return Accuracy::none(considered);
        }
        let candidate_tokens = tokenize(candidate, min);
        if candidate_tokens.is_empty() || considered == 0 {
            return Accuracy::none(considered);
        }

        let matched = reference_tokens
            .iter()
            .filter(|r| candidate_tokens.iter().any(|c| self.tokens_match(c, r)))
            .count();
        let ratio = matched as f64 / considered as f64;
        let (score, reasoning) = self.profile.scale.apply(ratio);

        Accuracy {
            score,
            ratio,
            matched,
            considered,
            reasoning: reasoning.to_string(),
        }
    }

    /// Score and attach a speed bonus when `elapsed` is given.
    ///
    /// A failure marker earns no speed bonus however fast it came back.
    pub fn evaluate(
        &self,
        candidate: &str,
        reference: &str,
        elapsed: Option<Duration>,
    ) -> EvaluationResult {
        let accuracy = self.score(candidate, reference);
        let time_score = match elapsed {
            Some(elapsed) if !is_failure_marker(candidate) => time_bonus(elapsed),
            _ => 0,
        };
        EvaluationResult {
            accuracy_score: accuracy.score,
            time_score,
            reasoning: accuracy.reasoning,
            ratio: accuracy.ratio,
        }
    }

    fn tokens_match(&self, candidate: &str, reference: &str) -> bool {
        candidate.contains(reference)
            || reference.contains(candidate)
            || self.profile.synonyms.related(candidate, reference)
    }
}

/// Speed bonus: under 2 s earns 2, under 4 s earns 1, otherwise 0.
pub fn time_bonus(elapsed: Duration) -> u32 {
    match elapsed.as_millis() {
        0..=1999 => 2,
        2000..=3999 => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_filters() {
        assert_eq!(
            tokenize("Use a HashMap; O(n) time!", 3),
            vec!["use", "hashmap", "time"]
        );
        assert_eq!(tokenize("snake_case stays", 3), vec!["snake_case", "stays"]);
        assert!(tokenize("", 3).is_empty());
        assert!(tokenize("a an to", 3).is_empty());
    }

    #[test]
    fn test_synonym_groups_are_symmetric() {
        let table = SynonymTable::technical();
        assert!(table.related("function", "procedure"));
        assert!(table.related("procedure", "function"));
        assert!(table.related("bug", "exception"));
        assert!(!table.related("function", "array"));
        assert!(!table.related("function", "function"));
    }

    #[test]
    fn test_keyed_relations_do_not_link_values() {
        let table = SynonymTable::cognitive();
        assert!(table.related("overflow", "wrap"));
        assert!(table.related("wrap", "overflow"));
        assert!(table.related("invalid", "contradiction"));
        assert!(table.related("invalid", "fallacy"));
        // Siblings under one key stay unrelated.
        assert!(!table.related("exceed", "wrap"));
    }

    #[test]
    fn test_synonym_table_insert_extends_lookup() {
        let mut table = SynonymTable::new();
        assert!(table.is_empty());
        table.insert("Cache", "memo");
        assert!(table.related("memo", "cache"));
        assert_eq!(table.related_to("cache").collect::<Vec<_>>(), vec!["memo"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_linear_scale_rounds() {
        assert_eq!(ScoreScale::Linear.apply(0.0).0, 0);
        assert_eq!(ScoreScale::Linear.apply(0.25).0, 3);
        assert_eq!(ScoreScale::Linear.apply(6.0 / 9.0).0, 7);
        assert_eq!(ScoreScale::Linear.apply(1.0).0, 10);
    }

    #[test]
    fn test_banded_scale_thresholds() {
        assert_eq!(ScoreScale::Banded.apply(0.80).0, 10);
        assert_eq!(ScoreScale::Banded.apply(0.79).0, 8);
        assert_eq!(ScoreScale::Banded.apply(0.65).0, 8);
        assert_eq!(ScoreScale::Banded.apply(0.50).0, 6);
        assert_eq!(ScoreScale::Banded.apply(0.35).0, 4);
        assert_eq!(ScoreScale::Banded.apply(0.34).0, 2);
        assert_eq!(ScoreScale::Banded.apply(0.0).0, 2);
    }

    #[test]
    fn test_hash_map_scenario_scores_high() {
        let candidate = "Use a hash map to get O(n) time: map complement.";
        let reference = "Use hash map for O(n): const map = new Map(); ... complement ...";

        let technical = Scorer::technical().score(candidate, reference);
        assert_eq!(technical.considered, 9);
        assert_eq!(technical.matched, 6);
        assert_eq!(technical.score, 7);

        assert!(Scorer::cognitive().score(candidate, reference).score >= 6);
    }

    #[test]
    fn test_empty_candidate_scores_zero() {
        for scorer in [Scorer::technical(), Scorer::cognitive()] {
            let accuracy = scorer.score("", "Use HashMap for O(1) lookups");
            assert_eq!(accuracy.score, 0);
            assert_eq!(accuracy.ratio, 0.0);
        }
    }

    #[test]
    fn test_reference_without_tokens_scores_zero() {
        let accuracy = Scorer::technical().score("anything at all", "a = b");
        assert_eq!(accuracy.considered, 0);
        assert_eq!(accuracy.score, 0);
        assert!(!accuracy.ratio.is_nan());
    }

    #[test]
    fn test_failure_markers_score_zero() {
        let reference = "Use .catch(error => handle(error)) for error handling";
        let scorer = Scorer::technical();
        assert_eq!(scorer.score("[API Error: timeout]", reference).score, 0);
        assert_eq!(
            scorer.score("[Parse Error: no answer for Q3]", reference).score,
            0
        );
        assert!(is_failure_marker("  [API Error: boom]"));
        assert!(!is_failure_marker("API Error handling uses retries"));
    }

    #[test]
    fn test_case_and_punctuation_invariance() {
        let reference = "Race condition bug. Use database transactions with row locking.";
        let scorer = Scorer::technical();
        let plain = scorer.score("race condition use transactions locking", reference);
        let noisy = scorer.score("RACE-condition!! Use: transactions, (locking)?", reference);
        assert_eq!(plain, noisy);
    }

    #[test]
    fn test_synonyms_count_as_matches() {
        let scorer = Scorer::technical();
        let with_synonym = scorer.score("exception", "error");
        assert_eq!(with_synonym.score, 10);
        let without = scorer.score("exception", "timeout");
        assert_eq!(without.score, 0);
    }

    #[test]
    fn test_time_bonus_boundaries() {
        let ms = Duration::from_millis;
        assert_eq!(time_bonus(ms(0)), 2);
        assert_eq!(time_bonus(ms(1999)), 2);
        assert_eq!(time_bonus(ms(2000)), 1);
        assert_eq!(time_bonus(ms(3999)), 1);
        assert_eq!(time_bonus(ms(4000)), 0);
        assert_eq!(time_bonus(ms(4001)), 0);
    }

    #[test]
    fn test_evaluate_adds_bonus_only_when_timed() {
        let scorer = Scorer::technical();
        let timed = scorer.evaluate("binary search", "binary search", Some(Duration::from_millis(10)));
        assert_eq!(timed.accuracy_score, 10);
        assert_eq!(timed.time_score, 2);
        assert_eq!(timed.total(), 12);

        let untimed = scorer.evaluate("binary search", "binary search", None);
        assert_eq!(untimed.time_score, 0);

        let failed = scorer.evaluate("[API Error: boom]", "binary search", Some(Duration::ZERO));
        assert_eq!(failed.total(), 0);
    }
}
