use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args as ClapArgs, Parser, Subcommand};
use nonogram_bench::client::OpenRouterClient;
use nonogram_bench::config::{BenchConfig, Concurrency};
use nonogram_bench::orchestrator::{BenchmarkOrchestrator, ProgressEvent, RunOptions};
use nonogram_bench::registry::{ModelFilter, ModelRegistry};
use nonogram_bench::report;
use scoring::artifact::{raw_path_for, write_raw_records, ResultsArtifact};
use scoring::corpus::{PuzzleCorpus, SizeLabel};
use scoring::history::{latest_per_pair, JsonlHistoryStore, RunHistory};
use scoring::skip_policy::{FailedRunPolicy, SkipPolicy};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

const NOTHING_TO_DO: &str = "All models and sizes have been benchmarked recently. Nothing to do.";

/// Benchmark LLMs on nonogram puzzles.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    scope: Scope,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Options shared by every subcommand.
#[derive(ClapArgs, Debug)]
struct Scope {
    /// TOML file of `[[models]]` replacing the built-in roster
    #[arg(long, global = true)]
    models_file: Option<PathBuf>,

    /// Only this model (repeatable, exact name)
    #[arg(long = "model", global = true)]
    models: Vec<String>,

    /// Only models configured for extended reasoning
    #[arg(long, global = true, conflicts_with = "non_reasoning_only")]
    reasoning_only: bool,

    /// Only models without extended reasoning
    #[arg(long, global = true)]
    non_reasoning_only: bool,

    /// Only puzzles of this size, e.g. 10x10 (repeatable)
    #[arg(long = "size", global = true)]
    sizes: Vec<SizeLabel>,

    /// Run history file (overrides NONOGRAM_BENCH_HISTORY)
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    /// Results artifact path (overrides NONOGRAM_BENCH_RESULTS)
    #[arg(long, global = true)]
    results: Option<PathBuf>,

    /// Days before a tested pair is due again (overrides NONOGRAM_BENCH_RERUN_DAYS)
    #[arg(long, global = true)]
    rerun_days: Option<i64>,

    /// Treat failed runs as untested so they are retried
    #[arg(long, global = true)]
    retry_failed: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Benchmark every pending (model, puzzle) pair (default)
    Run(RunArgs),
    /// Rebuild the results artifact from the history
    Export,
    /// List the puzzle corpus and check every solution against its clues
    Puzzles,
    /// List the effective model registry
    Models,
    /// Show recently tested and pending pairs per model
    Status,
}

#[derive(ClapArgs, Debug, Default)]
struct RunArgs {
    /// One call at a time per model
    #[arg(long)]
    sequential: bool,

    /// Per-model in-flight call cap (overrides NONOGRAM_BENCH_MAX_PARALLEL)
    #[arg(long)]
    max_parallel: Option<usize>,

    /// Output token budget per call
    #[arg(long)]
    max_output_tokens: Option<u32>,
}

/// Config, registry, corpus and history resolved once per invocation.
struct Session {
    config: BenchConfig,
    /// Unfiltered registry, used for artifact ordering.
    full_registry: ModelRegistry,
    registry: ModelRegistry,
    corpus: PuzzleCorpus,
    history: Arc<JsonlHistoryStore>,
}

fn resolve(scope: &Scope, run: Option<&RunArgs>) -> Result<Session> {
    let mut config = BenchConfig::from_env()?;
    if let Some(path) = &scope.history {
        config.history_path = path.clone();
    }
    if let Some(path) = &scope.results {
        config.results_path = path.clone();
    }
    if let Some(days) = scope.rerun_days {
        config.rerun_threshold_days = days;
    }
    if scope.retry_failed {
        config.failed_runs = FailedRunPolicy::Retry;
    }
    if let Some(run) = run {
        if run.sequential {
            config.concurrency = Concurrency::Sequential;
        }
        if let Some(n) = run.max_parallel {
            config.max_parallel_per_model = n;
        }
        if let Some(n) = run.max_output_tokens {
            config.max_output_tokens = n;
        }
    }
    config.validate()?;

    let full_registry = match &scope.models_file {
        Some(path) => ModelRegistry::load(path)
            .with_context(|| format!("loading models from {}", path.display()))?,
        None => ModelRegistry::builtin(),
    };
    let registry = full_registry.filter(&ModelFilter {
        names: scope.models.clone(),
        reasoning_only: scope.reasoning_only,
        non_reasoning_only: scope.non_reasoning_only,
    })?;

    let mut corpus = PuzzleCorpus::builtin();
    if !scope.sizes.is_empty() {
        corpus = corpus.filter_sizes(&scope.sizes);
    }

    let history = Arc::new(JsonlHistoryStore::new(&config.history_path));
    Ok(Session {
        config,
        full_registry,
        registry,
        corpus,
        history,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => run(resolve(&cli.scope, Some(&args))?).await,
        Command::Export => export(&resolve(&cli.scope, None)?).await,
        Command::Puzzles => puzzles(&resolve(&cli.scope, None)?),
        Command::Models => {
            let ctx = resolve(&cli.scope, None)?;
            println!("{}", report::models_table(&ctx.registry).render());
            println!("{} model(s)", ctx.registry.len());
            Ok(())
        }
        Command::Status => status(&resolve(&cli.scope, None)?).await,
    }
}

async fn run(ctx: Session) -> Result<()> {
    for problem in ctx.corpus.audit() {
        warn!("puzzle integrity problem: {problem}");
    }

    let records = ctx.history.load_all().await?;
    let policy = SkipPolicy::from_records(
        &records,
        ctx.config.rerun_threshold_days,
        ctx.config.failed_runs,
    );
    let now = Utc::now();

    let recent = policy.recent_counts(now);
    if !recent.is_empty() {
        println!(
            "\nRecent benchmark runs found (within {} days):",
            policy.threshold_days()
        );
        for (model, count) in &recent {
            println!("  {model}: {count} puzzle(s)");
        }
    }

    if !policy.has_work_to_do(ctx.registry.names(), ctx.corpus.puzzles(), now) {
        println!("\n{NOTHING_TO_DO}");
        return Ok(());
    }

    let client = OpenRouterClient::new(
        &ctx.config.api_base_url,
        ctx.config.require_api_key()?,
        ctx.config.request_timeout_secs,
    )?;

    println!("\n{}", report::rule("STARTING BENCHMARK"));
    println!(
        "Models: {}",
        ctx.registry.names().collect::<Vec<_>>().join(", ")
    );
    println!(
        "Sizes: {}",
        ctx.corpus
            .sizes()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("History: {}", ctx.history.path().display());
    println!("{}\n", "=".repeat(60));

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let printer = tokio::spawn(print_progress(rx));

    let orchestrator = BenchmarkOrchestrator::new(
        Arc::new(client),
        ctx.history.clone(),
        ctx.registry.clone(),
        ctx.corpus.clone(),
        RunOptions::from_config(&ctx.config),
    )
    .with_progress(tx);

    let outcome = orchestrator.run(Utc::now()).await?;
    drop(orchestrator);
    if let Err(e) = printer.await {
        warn!("progress printer stopped: {e}");
    }

    if outcome.is_empty() {
        println!("\n{NOTHING_TO_DO}");
        return Ok(());
    }

    println!("\n{}", report::session_report(&outcome.results, &ctx.registry));
    if outcome.persist_failures > 0 {
        warn!(
            count = outcome.persist_failures,
            "some results could not be written to the history"
        );
    }

    println!("\nResults saved to history: {}", ctx.history.path().display());
    export(&ctx).await
}

/// Render progress events as console lines until the sender is dropped.
async fn print_progress(mut rx: UnboundedReceiver<ProgressEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            ProgressEvent::ModelStarted { .. } | ProgressEvent::ModelFinished { .. } => {}
            ProgressEvent::SizeSkipped { model, size, total } => {
                println!("[{model}] Skipping {size} (all {total} puzzles recently benchmarked)");
            }
            ProgressEvent::SizeStarted {
                model,
                size,
                pending,
                skipped,
            } => {
                if skipped > 0 {
                    println!("[{model}] Starting {size} ({pending} puzzles, {skipped} skipped)");
                } else {
                    println!("[{model}] Starting {size} ({pending} puzzles)");
                }
            }
            ProgressEvent::PuzzleFinished {
                model,
                size,
                completed,
                of,
                result,
            } => {
                println!("[{model}] {size} puzzle {completed}/{of}: {}", result.glyph());
            }
            ProgressEvent::SizeFinished {
                model,
                size,
                correct,
                failed,
                total,
            } => {
                println!("[{model}] Completed {size}: {correct}/{total} correct, {failed} failed");
            }
        }
    }
}

async fn export(ctx: &Session) -> Result<()> {
    let records = ctx.history.load_all().await?;
    if records.is_empty() {
        println!("No runs recorded in {}", ctx.history.path().display());
        return Ok(());
    }

    let selected = latest_per_pair(&records);
    let results: Vec<_> = selected.iter().map(|r| r.result.clone()).collect();
    let artifact = ResultsArtifact::build(&results, &ctx.full_registry.infos(), Utc::now());

    write_artifact(&artifact, &ctx.config.results_path)?;
    let raw = raw_path_for(&ctx.config.results_path);
    write_raw_records(&selected, &raw)
        .with_context(|| format!("writing {}", raw.display()))?;

    info!(
        records = records.len(),
        selected = selected.len(),
        models = artifact.by_model.len(),
        "exported results"
    );
    println!(
        "Exported {} run(s) across {} model(s) to {} (raw: {})",
        selected.len(),
        artifact.by_model.len(),
        ctx.config.results_path.display(),
        raw.display()
    );
    Ok(())
}

fn write_artifact(artifact: &ResultsArtifact, path: &Path) -> Result<()> {
    artifact
        .write_json(path)
        .with_context(|| format!("writing {}", path.display()))
}

fn puzzles(ctx: &Session) -> Result<()> {
    println!("{}", report::puzzles_table(&ctx.corpus).render());
    let problems = ctx.corpus.audit();
    for problem in &problems {
        eprintln!("  {problem}");
    }
    if !problems.is_empty() {
        bail!("{} puzzle integrity problem(s)", problems.len());
    }
    println!("{} puzzle(s), all consistent with their clues", ctx.corpus.len());
    Ok(())
}

async fn status(ctx: &Session) -> Result<()> {
    let records = ctx.history.load_all().await?;
    let policy = SkipPolicy::from_records(
        &records,
        ctx.config.rerun_threshold_days,
        ctx.config.failed_runs,
    );
    let now = Utc::now();

    println!(
        "{}",
        report::status_table(&ctx.registry, &ctx.corpus, &policy, now).render()
    );
    println!(
        "{} record(s) in {}; re-run threshold {} days",
        records.len(),
        ctx.history.path().display(),
        policy.threshold_days()
    );
    if policy.has_work_to_do(ctx.registry.names(), ctx.corpus.puzzles(), now) {
        println!("Pending work: yes");
    } else {
        println!("Pending work: no. {NOTHING_TO_DO}");
    }
    Ok(())
}
