//! perfbench - LLM performance benchmark harness
//!
//! ## Commands
//!
//! - `benchmark`: 20 technical questions, accuracy plus speed bonus (default)
//! - `cognitive`: 5 reasoning questions, accuracy only
//! - `daily`: both runs, weighted score, history line and dated reports
//! - `history`: list the daily history log

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::{info, Level};

use perfbench_core::daily::render_summary_text;
use perfbench_core::{
    prepare_results_file, read_history, save_outcome, summarize_history, AnswerSource,
    BatchedSource, BenchConfig, BenchmarkRunner, DailyRunner, LiveSource, RunMode, RunOutcome,
    SimulatedSource, METRICS,
};
use perfbench_llm::{LlmConfig, LlmError, MessagesClient};

#[derive(Parser, Debug)]
#[command(name = "perfbench")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LLM performance benchmark harness", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Also append JSON log lines to <DIR>/perfbench-<date>.log
    #[arg(long, global = true, env = "PERFBENCH_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the technical benchmark (20 questions, 12 points each)
    Benchmark(SourceArgs),

    /// Run the cognitive reasoning test (5 questions, 10 points each)
    Cognitive(SourceArgs),

    /// Run both, record the weighted score and write the daily reports
    Daily(SourceArgs),

    /// Show the daily score history
    History {
        /// Directory holding daily-results.log
        #[arg(long, env = "PERFBENCH_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,
    },
}

/// Where answers come from.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
enum SourceKind {
    /// Canned answers, no network
    #[default]
    Simulated,
    /// One API call per question
    Live,
    /// One API call for the whole bank
    Batched,
}

#[derive(Args, Debug, Clone, Default)]
struct SourceArgs {
    /// Answer source
    #[arg(long, value_enum, default_value_t = SourceKind::Simulated)]
    source: SourceKind,

    /// Ask questions in bank order
    #[arg(long)]
    no_shuffle: bool,

    /// Seed for the question order and the simulated pause
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the simulated thinking pause
    #[arg(long)]
    no_delay: bool,

    /// Directory for result CSVs, history and Reports/
    #[arg(long, env = "PERFBENCH_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Model identifier for live and batched sources
    #[arg(long, env = "PERFBENCH_MODEL")]
    model: Option<String>,

    /// Per-call deadline for live and batched sources
    #[arg(long, env = "PERFBENCH_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    perfbench_core::init_tracing(cli.json, level, cli.log_dir.as_deref());

    let result = match cli.command {
        None => cmd_run(RunMode::Benchmark, &SourceArgs::default(), cli.json).await,
        Some(Commands::Benchmark(args)) => cmd_run(RunMode::Benchmark, &args, cli.json).await,
        Some(Commands::Cognitive(args)) => cmd_run(RunMode::Cognitive, &args, cli.json).await,
        Some(Commands::Daily(args)) => cmd_daily(&args, cli.json).await,
        Some(Commands::History { output_dir }) => cmd_history(output_dir.as_deref(), cli.json),
    };

    METRICS.flush();
    result
}

fn bench_config(args: &SourceArgs) -> perfbench_core::Result<BenchConfig> {
    let mut config = BenchConfig::from_env()
        .with_shuffle(!args.no_shuffle)
        .with_seed(args.seed);
    if let Some(dir) = &args.output_dir {
        config = config.with_output_dir(dir);
    }
    if args.no_delay {
        config = config.with_delay(None);
    }
    config.validate()?;
    Ok(config)
}

fn llm_client(args: &SourceArgs) -> perfbench_core::Result<MessagesClient> {
    let mut config = LlmConfig::from_env();
    if let Some(model) = &args.model {
        config = config.with_model(model);
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if !config.has_api_key() {
        return Err(LlmError::MissingApiKey.into());
    }
    info!(model = %config.model, base_url = %config.base_url, "using live model");
    Ok(MessagesClient::new(config)?)
}

fn build_source(
    args: &SourceArgs,
    mode: RunMode,
    config: &BenchConfig,
) -> perfbench_core::Result<Box<dyn AnswerSource>> {
    let source: Box<dyn AnswerSource> = match args.source {
        SourceKind::Simulated => {
            let mut source = SimulatedSource::new();
            if let Some(delay) = config.delay.clone() {
                source = source.with_delay(delay);
            }
            if let Some(seed) = config.seed {
                source = source.with_seed(seed);
            }
            Box::new(source)
        }
        SourceKind::Live => Box::new(LiveSource::new(llm_client(args)?, mode.prompt_style())),
        SourceKind::Batched => {
            Box::new(BatchedSource::new(llm_client(args)?, mode.prompt_style()))
        }
    };
    Ok(source)
}

async fn cmd_run(mode: RunMode, args: &SourceArgs, json: bool) -> Result<()> {
    let config = bench_config(args).context("Invalid run configuration")?;
    let mut source =
        build_source(args, mode, &config).context("Failed to set up the answer source")?;

    let results = prepare_results_file(&config.output_dir, mode);
    let outcome = BenchmarkRunner::from_config(mode, &config)
        .run(source.as_mut())
        .await;
    let saved = save_outcome(&results, &outcome);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialize run outcome")?
        );
        return Ok(());
    }

    print_outcome(&outcome);
    if saved {
        println!("Results saved to {}", results.path().display());
    } else {
        println!("Results could not be saved to {}", results.path().display());
    }
    Ok(())
}

async fn cmd_daily(args: &SourceArgs, json: bool) -> Result<()> {
    let config = bench_config(args).context("Invalid run configuration")?;
    let mut benchmark_source = build_source(args, RunMode::Benchmark, &config)
        .context("Failed to set up the benchmark answer source")?;
    let mut cognitive_source = build_source(args, RunMode::Cognitive, &config)
        .context("Failed to set up the cognitive answer source")?;

    let outcome = DailyRunner::new(config)
        .run(benchmark_source.as_mut(), cognitive_source.as_mut())
        .await;

    if json {
        let value = json!({
            "summary": outcome.summary,
            "trend": outcome.trend,
            "reports": outcome.reports,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("Failed to serialize daily outcome")?
        );
        return Ok(());
    }

    print!("{}", render_summary_text(&outcome.summary));
    println!();
    println!(
        "Trend: {} over {} run(s)",
        outcome.trend.trend.as_str(),
        outcome.trend.data_points
    );
    for line in &outcome.trend.recommendations {
        println!("  - {}", line);
    }
    for path in &outcome.reports {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn cmd_history(output_dir: Option<&Path>, json: bool) -> Result<()> {
    let mut config = BenchConfig::from_env();
    if let Some(dir) = output_dir {
        config = config.with_output_dir(dir);
    }
    let path = config.output_path(perfbench_core::daily::HISTORY_FILE);
    let entries = read_history(&path)
        .with_context(|| format!("Failed to read history from {}", path.display()))?;
    let summary = summarize_history(&entries);

    if json {
        let value = json!({ "entries": entries, "summary": summary });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("Failed to serialize history")?
        );
        return Ok(());
    }

    let Some(summary) = summary else {
        println!("No daily history yet in {}", path.display());
        return Ok(());
    };

    println!("Daily history ({})", path.display());
    println!("{}", "=".repeat(50));
    let last = entries.len() - 1;
    for (i, entry) in entries.iter().enumerate() {
        let elapsed = entry
            .elapsed_secs
            .map(|s| format!("{}s", s))
            .unwrap_or_else(|| "-".to_string());
        let marker = if i == last { "  <- latest" } else { "" };
        println!(
            "{}  {:>6.1}%  {:>6}  {}{}",
            entry.date, entry.score, elapsed, entry.clock, marker
        );
    }
    println!("{}", "=".repeat(50));
    let direction = match summary.direction {
        1 => "above",
        -1 => "below",
        _ => "at",
    };
    println!("Runs:    {}", summary.runs);
    println!("Average: {:.1}%", summary.average);
    println!("Latest:  {:.1}% ({} average)", summary.latest, direction);
    Ok(())
}

fn print_outcome(outcome: &RunOutcome) {
    let title = match outcome.mode {
        RunMode::Benchmark => "AI Performance Benchmark",
        RunMode::Cognitive => "Cognitive Reasoning Test",
    };
    println!();
    println!("{} ({} answers)", title, outcome.source);
    println!("{}", "=".repeat(50));
    for (category, aggregate) in &outcome.categories {
        println!(
            "{:<24} {:>3}/{:<3} {:>6.1}%  avg {:.1}",
            category.display_name(),
            aggregate.score,
            aggregate.total,
            aggregate.percentage(),
            aggregate.average()
        );
    }
    println!("{}", "=".repeat(50));
    println!(
        "Total:   {}/{} ({:.1}%)",
        outcome.total_score, outcome.max_score, outcome.percentage
    );
    println!("Grade:   {}", outcome.grade.display_name());
    println!("         {}", outcome.grade_message());
    println!(
        "Time:    {:.1}s, {} ms average per question",
        outcome.duration_ms as f64 / 1000.0,
        outcome.average_response_ms()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn offline_args(dir: &Path) -> SourceArgs {
        SourceArgs {
            no_shuffle: true,
            no_delay: true,
            output_dir: Some(dir.to_path_buf()),
            ..SourceArgs::default()
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command_defaults_to_benchmark() {
        let cli = Cli::try_parse_from(["perfbench"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(SourceArgs::default().source, SourceKind::Simulated);
    }

    #[test]
    fn test_daily_flags_parse() {
        let cli = Cli::try_parse_from([
            "perfbench",
            "daily",
            "--source",
            "batched",
            "--seed",
            "7",
            "--no-delay",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Daily(args)) => {
                assert_eq!(args.source, SourceKind::Batched);
                assert_eq!(args.seed, Some(7));
                assert!(args.no_delay);
                assert!(!args.no_shuffle);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_source_rejected() {
        assert!(Cli::try_parse_from(["perfbench", "benchmark", "--source", "mystery"]).is_err());
    }

    #[test]
    fn test_bench_config_applies_flags() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = offline_args(dir.path());
        args.seed = Some(9);
        let config = bench_config(&args).unwrap();
        assert!(!config.shuffle);
        assert_eq!(config.seed, Some(9));
        assert!(config.delay.is_none());
        assert_eq!(config.output_dir, dir.path());
    }

    #[test]
    fn test_simulated_source_needs_no_key() {
        let dir = tempfile::tempdir().unwrap();
        let args = offline_args(dir.path());
        let config = bench_config(&args).unwrap();
        let source = build_source(&args, RunMode::Benchmark, &config).unwrap();
        assert_eq!(source.name(), "simulated");
    }

    #[tokio::test]
    async fn test_cognitive_command_writes_results_csv() {
        let dir = tempfile::tempdir().unwrap();
        cmd_run(RunMode::Cognitive, &offline_args(dir.path()), true)
            .await
            .unwrap();
        let csv = std::fs::read_to_string(
            dir.path()
                .join(perfbench_core::report::COGNITIVE_RESULTS_FILE),
        )
        .unwrap();
        assert!(csv.starts_with("Timestamp,"));
    }

    #[test]
    fn test_history_on_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        cmd_history(Some(dir.path()), false).unwrap();
    }

    #[test]
    fn test_history_lists_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(perfbench_core::daily::HISTORY_FILE),
            "2024-05-01\t71.2%\t40s\t09:00:00\n2024-05-02\t74.0%\t38s\t09:01:00\n",
        )
        .unwrap();
        cmd_history(Some(dir.path()), true).unwrap();
    }
}
