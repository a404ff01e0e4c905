//! End-to-end runs against offline answer sources.

use perfbench_core::scoring::MAX_ACCURACY;
use perfbench_core::{
    BenchmarkRunner, Grade, LiveSource, QuestionBank, RunMode, SimulatedSource,
};
use perfbench_llm::fakes::ScriptedGenerator;

fn assert_category_invariants(outcome: &perfbench_core::RunOutcome, points: u32) {
    let score_sum: u32 = outcome.categories.values().map(|c| c.score).sum();
    let total_sum: u32 = outcome.categories.values().map(|c| c.total).sum();
    assert_eq!(score_sum, outcome.total_score);
    assert_eq!(total_sum, outcome.records.len() as u32 * points);
    assert_eq!(total_sum, outcome.max_score);
    for aggregate in outcome.categories.values() {
        assert!(aggregate.score <= aggregate.total);
    }
}

#[tokio::test]
async fn test_simulated_benchmark_run() {
    let runner = BenchmarkRunner::new(RunMode::Benchmark).with_seed(Some(11));
    let mut source = SimulatedSource::new();
    let outcome = runner.run(&mut source).await;

    assert_eq!(outcome.records.len(), 20);
    assert_eq!(outcome.max_score, 240);
    assert_eq!(outcome.source, "simulated");
    assert_eq!(outcome.bank_digest, QuestionBank::technical().digest());
    assert_category_invariants(&outcome, 12);
    assert_eq!(outcome.categories.len(), 5);

    for record in &outcome.records {
        assert!(record.accuracy_score <= MAX_ACCURACY);
        // No pause configured, so every answer earns the full speed bonus.
        assert_eq!(record.time_score, 2, "{}", record.test_id);
        assert!(record.question.chars().count() <= 200);
        assert!(record.candidate_response.chars().count() <= 300);
    }

    let expected = outcome.total_score as f64 / 240.0 * 100.0;
    assert!((outcome.percentage - expected).abs() < 1e-9);
    assert_eq!(
        outcome.grade,
        RunMode::Benchmark.grade_scale().grade(outcome.percentage)
    );
}

#[tokio::test]
async fn test_seeded_runs_ask_in_the_same_order() {
    let runner = BenchmarkRunner::new(RunMode::Benchmark).with_seed(Some(3));
    let first = runner.run(&mut SimulatedSource::new()).await;
    let second = runner.run(&mut SimulatedSource::new()).await;

    let ids = |o: &perfbench_core::RunOutcome| -> Vec<String> {
        o.records.iter().map(|r| r.test_id.clone()).collect()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_ne!(first.run_id, second.run_id);
}

#[tokio::test]
async fn test_simulated_cognitive_run_has_no_speed_bonus() {
    let runner = BenchmarkRunner::new(RunMode::Cognitive).with_shuffle(false);
    let outcome = runner.run(&mut SimulatedSource::new()).await;

    assert_eq!(outcome.records.len(), 5);
    assert_eq!(outcome.max_score, 50);
    assert_category_invariants(&outcome, 10);
    for record in &outcome.records {
        assert_eq!(record.time_score, 0);
        assert!(record.total_score <= 10);
        assert!(!record.reasoning.is_empty());
    }
    assert_eq!(outcome.records[0].test_id, "logic_puzzle");
}

#[tokio::test]
async fn test_failed_api_calls_degrade_score_without_aborting() {
    let generator = ScriptedGenerator::new();
    for _ in 0..5 {
        generator.push_failure("upstream unavailable");
    }
    let mut source = LiveSource::new(generator, RunMode::Cognitive.prompt_style());
    let outcome = BenchmarkRunner::new(RunMode::Cognitive)
        .run(&mut source)
        .await;

    assert_eq!(outcome.records.len(), 5);
    assert_eq!(outcome.total_score, 0);
    assert_eq!(outcome.grade, Grade::NeedsImprovement);
    assert!(outcome
        .records
        .iter()
        .all(|r| r.candidate_response.starts_with("[API Error:")));
    assert_eq!(source.generator().calls(), 5);
}

#[tokio::test]
async fn test_live_source_answers_flow_into_scores() {
    let bank = QuestionBank::cognitive();
    let generator = ScriptedGenerator::replies(bank.iter().map(|q| q.correct_answer.clone()));
    let mut source = LiveSource::new(generator, RunMode::Cognitive.prompt_style());

    let outcome = BenchmarkRunner::new(RunMode::Cognitive)
        .with_shuffle(false)
        .run(&mut source)
        .await;

    // Echoing the reference answer matches every reference token.
    assert_eq!(outcome.total_score, 50);
    assert_eq!(outcome.grade, Grade::Excellent);
}
