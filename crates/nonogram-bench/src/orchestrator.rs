//! Benchmark orchestrator: model × puzzle fan-out with per-call recovery.
//!
//! ```text
//! run(now)
//!   ├─ load history → SkipPolicy snapshot
//!   ├─ nothing pending? → return empty outcome, no calls
//!   └─ JoinSet::spawn(model_i) × M          (models fully parallel)
//!        └─ for size in ascending sizes     (one group at a time)
//!             └─ JoinSet::spawn(puzzle_j)   (Semaphore-capped per model)
//!                  ├─ run_single → RunResult (never errors)
//!                  └─ append to history immediately
//! ```
//!
//! A failed call becomes a `failed` [`RunResult`]; a failed history append is
//! logged and counted. Neither stops the rest of the matrix.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use scoring::corpus::{Puzzle, PuzzleCorpus, SizeLabel};
use scoring::grading::{cell_differences, grade};
use scoring::history::{HistoryError, SharedHistory};
use scoring::record::{RunRecord, RunResult};
use scoring::skip_policy::{FailedRunPolicy, SkipPolicy, DEFAULT_RERUN_THRESHOLD_DAYS};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::client::{CompletionClient, CompletionRequest};
use crate::config::{
    BenchConfig, Concurrency, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MAX_PARALLEL_PER_MODEL,
};
use crate::prompts::system_instruction;
use crate::registry::{ModelRegistry, ModelSpec};

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Failures that prevent a run from starting at all.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("could not read run history: {0}")]
    History(#[from] HistoryError),
}

/// Knobs for one orchestrator run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub rerun_threshold_days: i64,
    pub failed_runs: FailedRunPolicy,
    pub max_parallel_per_model: usize,
    pub concurrency: Concurrency,
    pub max_output_tokens: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            rerun_threshold_days: DEFAULT_RERUN_THRESHOLD_DAYS,
            failed_runs: FailedRunPolicy::default(),
            max_parallel_per_model: DEFAULT_MAX_PARALLEL_PER_MODEL,
            concurrency: Concurrency::default(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl RunOptions {
    pub fn from_config(config: &BenchConfig) -> Self {
        Self {
            rerun_threshold_days: config.rerun_threshold_days,
            failed_runs: config.failed_runs,
            max_parallel_per_model: config.max_parallel_per_model,
            concurrency: config.concurrency,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Human-facing progress notifications. Purely observational.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    ModelStarted {
        model: String,
        pending: usize,
        skipped: usize,
    },
    /// Every puzzle of this size was tested recently.
    SizeSkipped {
        model: String,
        size: SizeLabel,
        total: usize,
    },
    SizeStarted {
        model: String,
        size: SizeLabel,
        pending: usize,
        skipped: usize,
    },
    /// `completed` counts finished calls in this size group, 1-based.
    PuzzleFinished {
        model: String,
        size: SizeLabel,
        completed: usize,
        of: usize,
        result: RunResult,
    },
    SizeFinished {
        model: String,
        size: SizeLabel,
        correct: usize,
        failed: usize,
        total: usize,
    },
    ModelFinished {
        model: String,
        runs: usize,
    },
}

/// What one `run` produced.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkOutcome {
    pub session_id: String,
    /// Results of this session, grouped by model in registry order.
    pub results: Vec<RunResult>,
    /// Pairs skipped as recently tested.
    pub skipped: usize,
    /// Results whose history append failed.
    pub persist_failures: usize,
}

impl BenchmarkOutcome {
    /// True when no completion call was made.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Shared between the spawned tasks of one run.
struct Shared {
    client: Arc<dyn CompletionClient>,
    history: SharedHistory,
    options: RunOptions,
    progress: Option<UnboundedSender<ProgressEvent>>,
}

impl Shared {
    fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.progress {
            // A dropped receiver only loses progress output.
            let _ = tx.send(event);
        }
    }

    async fn run_single(&self, model: &ModelSpec, puzzle: &Puzzle) -> RunResult {
        let request = CompletionRequest {
            model: model.clone(),
            system: system_instruction(puzzle.width, puzzle.height),
            prompt: puzzle.clues.canonical.clone(),
            max_output_tokens: self.options.max_output_tokens,
        };

        let start = Instant::now();
        let outcome = self.client.complete(&request).await;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(response) => {
                let correct = grade(&response.solution, &puzzle.solution);
                if !correct {
                    debug!(
                        model = %model.name,
                        puzzle = %puzzle.id,
                        differing_cells = cell_differences(&response.solution, &puzzle.solution),
                        "incorrect solution"
                    );
                }
                RunResult::success(
                    &model.name,
                    &puzzle.id,
                    puzzle.size(),
                    correct,
                    response.usage.cost,
                    response.usage.tokens,
                    duration_ms,
                )
            }
            Err(e) => {
                warn!(
                    model = %model.name,
                    puzzle = %puzzle.id,
                    category = %e.retry_category(),
                    "completion failed: {e}"
                );
                RunResult::failed(
                    &model.name,
                    &puzzle.id,
                    puzzle.size(),
                    duration_ms,
                    e.to_string(),
                )
            }
        }
    }

    /// Persist one result stamped with the run's `now`, so a later run at the
    /// same instant sees it inside the re-run window. Returns false if the
    /// append failed.
    async fn persist(&self, session_id: &str, at: DateTime<Utc>, result: &RunResult) -> bool {
        let record = RunRecord::new(session_id, at, result.clone());
        match self.history.append(&record).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    model = %result.model,
                    puzzle = %result.puzzle_id,
                    "failed to persist run: {e}"
                );
                false
            }
        }
    }
}

/// Per-model totals returned from a model task.
struct ModelRun {
    index: usize,
    results: Vec<RunResult>,
    skipped: usize,
    persist_failures: usize,
}

pub struct BenchmarkOrchestrator {
    shared: Arc<Shared>,
    registry: ModelRegistry,
    corpus: Arc<PuzzleCorpus>,
}

impl BenchmarkOrchestrator {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        history: SharedHistory,
        registry: ModelRegistry,
        corpus: PuzzleCorpus,
        options: RunOptions,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                client,
                history,
                options,
                progress: None,
            }),
            registry,
            corpus: Arc::new(corpus),
        }
    }

    /// Send progress events to `tx`. Must be called before `run`.
    pub fn with_progress(mut self, tx: UnboundedSender<ProgressEvent>) -> Self {
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.progress = Some(tx);
        }
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn corpus(&self) -> &PuzzleCorpus {
        &self.corpus
    }

    /// Snapshot the history into a skip policy as of now.
    pub async fn skip_policy(&self) -> OrchestratorResult<SkipPolicy> {
        let records = self.shared.history.load_all().await?;
        Ok(SkipPolicy::from_records(
            &records,
            self.shared.options.rerun_threshold_days,
            self.shared.options.failed_runs,
        ))
    }

    /// Whether any (model, puzzle) pair still needs a run at `now`.
    pub async fn has_work_to_do(&self, now: DateTime<Utc>) -> OrchestratorResult<bool> {
        let policy = self.skip_policy().await?;
        Ok(policy.has_work_to_do(self.registry.names(), self.corpus.puzzles(), now))
    }

    /// One call with its recovery boundary. Always yields a result.
    pub async fn run_single(&self, model: &ModelSpec, puzzle: &Puzzle) -> RunResult {
        self.shared.run_single(model, puzzle).await
    }

    /// Run every pending pair in the matrix.
    pub async fn run(&self, now: DateTime<Utc>) -> OrchestratorResult<BenchmarkOutcome> {
        let policy = Arc::new(self.skip_policy().await?);
        let total_pairs = self.registry.len() * self.corpus.len();

        for (model, count) in policy.recent_counts(now) {
            info!(model = %model, puzzles = count, "recently benchmarked");
        }

        if !policy.has_work_to_do(self.registry.names(), self.corpus.puzzles(), now) {
            info!(
                threshold_days = policy.threshold_days(),
                "nothing to do: every pair benchmarked recently"
            );
            return Ok(BenchmarkOutcome {
                skipped: total_pairs,
                ..Default::default()
            });
        }

        let session_id = Uuid::new_v4().to_string();
        info!(
            session = %session_id,
            models = self.registry.len(),
            puzzles = self.corpus.len(),
            sizes = ?self.corpus.sizes().iter().map(ToString::to_string).collect::<Vec<_>>(),
            "starting benchmark"
        );

        let mut join_set: JoinSet<ModelRun> = JoinSet::new();
        for (index, model) in self.registry.models().iter().cloned().enumerate() {
            let shared = self.shared.clone();
            let corpus = self.corpus.clone();
            let policy = policy.clone();
            let session_id = session_id.clone();
            join_set.spawn(async move {
                run_model(shared, corpus, policy, model, index, session_id, now).await
            });
        }

        let mut runs = Vec::with_capacity(self.registry.len());
        while let Some(res) = join_set.join_next().await {
            match res {
                Ok(run) => runs.push(run),
                Err(e) => error!("model task panicked: {e}"),
            }
        }
        runs.sort_by_key(|r| r.index);

        let mut outcome = BenchmarkOutcome {
            session_id,
            ..Default::default()
        };
        for run in runs {
            outcome.skipped += run.skipped;
            outcome.persist_failures += run.persist_failures;
            outcome.results.extend(run.results);
        }

        info!(
            session = %outcome.session_id,
            runs = outcome.results.len(),
            skipped = outcome.skipped,
            persist_failures = outcome.persist_failures,
            "benchmark finished"
        );
        Ok(outcome)
    }
}

/// All size groups of one model, smallest first.
async fn run_model(
    shared: Arc<Shared>,
    corpus: Arc<PuzzleCorpus>,
    policy: Arc<SkipPolicy>,
    model: ModelSpec,
    index: usize,
    session_id: String,
    now: DateTime<Utc>,
) -> ModelRun {
    let groups = corpus.size_groups();
    let plan: Vec<(SizeLabel, usize, Vec<Puzzle>)> = groups
        .iter()
        .map(|(size, puzzles)| {
            let pending = policy
                .pending(&model.name, puzzles, now)
                .into_iter()
                .cloned()
                .collect();
            (*size, puzzles.len(), pending)
        })
        .collect();

    let pending_total: usize = plan.iter().map(|(_, _, p)| p.len()).sum();
    let skipped = corpus.len() - pending_total;
    let mut run = ModelRun {
        index,
        results: Vec::with_capacity(pending_total),
        skipped,
        persist_failures: 0,
    };

    if pending_total == 0 {
        info!(model = %model.name, "all sizes benchmarked recently, skipping model");
        return run;
    }

    shared.emit(ProgressEvent::ModelStarted {
        model: model.name.clone(),
        pending: pending_total,
        skipped,
    });

    let cap = model.parallel_cap(
        shared.options.max_parallel_per_model,
        shared.options.concurrency,
    );

    for (size, total, pending) in plan {
        if pending.is_empty() {
            debug!(
                model = %model.name,
                size = %size,
                total,
                "skipping size: all puzzles recently benchmarked"
            );
            shared.emit(ProgressEvent::SizeSkipped {
                model: model.name.clone(),
                size,
                total,
            });
            continue;
        }

        let of = pending.len();
        debug!(
            model = %model.name,
            size = %size,
            puzzles = of,
            skipped = total - of,
            "starting size"
        );
        shared.emit(ProgressEvent::SizeStarted {
            model: model.name.clone(),
            size,
            pending: of,
            skipped: total - of,
        });

        let sem = Arc::new(Semaphore::new(cap));
        let spec = Arc::new(model.clone());
        let mut join_set: JoinSet<(RunResult, bool)> = JoinSet::new();
        for puzzle in pending {
            let sem = sem.clone();
            let shared = shared.clone();
            let spec = spec.clone();
            let session_id = session_id.clone();
            join_set.spawn(async move {
                let _permit = sem.acquire().await.expect("semaphore closed");
                let result = shared.run_single(&spec, &puzzle).await;
                let persisted = shared.persist(&session_id, now, &result).await;
                (result, persisted)
            });
        }

        let (mut correct, mut failed, mut completed) = (0, 0, 0);
        while let Some(res) = join_set.join_next().await {
            let (result, persisted) = match res {
                Ok(pair) => pair,
                Err(e) => {
                    error!(model = %model.name, size = %size, "puzzle task panicked: {e}");
                    continue;
                }
            };
            completed += 1;
            correct += usize::from(result.correct);
            failed += usize::from(result.is_failed());
            if !persisted {
                run.persist_failures += 1;
            }
            debug!(
                model = %model.name,
                size = %size,
                "puzzle {completed}/{of}: {}",
                result.glyph()
            );
            shared.emit(ProgressEvent::PuzzleFinished {
                model: model.name.clone(),
                size,
                completed,
                of,
                result: result.clone(),
            });
            run.results.push(result);
        }

        debug!(
            model = %model.name,
            size = %size,
            "completed {size}: {correct}/{completed} correct, {failed} failed"
        );
        shared.emit(ProgressEvent::SizeFinished {
            model: model.name.clone(),
            size,
            correct,
            failed,
            total: completed,
        });
    }

    shared.emit(ProgressEvent::ModelFinished {
        model: model.name.clone(),
        runs: run.results.len(),
    });
    run
}
