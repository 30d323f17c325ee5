//! Orchestrator integration tests with scripted completion clients.
//!
//! No network. Each test wires a fake [`CompletionClient`] and an in-memory
//! (or temp-dir JSONL) history into a [`BenchmarkOrchestrator`] and checks:
//! 1. One failing call never aborts the rest of the matrix
//! 2. A second run right after a complete one, even at the same `now`, makes
//!    zero calls
//! 3. Pairs inside the re-run window are skipped
//! 4. Size groups run smallest first, one group at a time
//! 5. The per-model in-flight cap holds in both concurrency modes
//! 6. A history that refuses writes is counted, not fatal

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use mockall::mock;
use nonogram_bench::client::{CompletionClient, CompletionError, CompletionRequest, CompletionResponse};
use nonogram_bench::config::Concurrency;
use nonogram_bench::orchestrator::{BenchmarkOrchestrator, ProgressEvent, RunOptions};
use nonogram_bench::registry::{ModelRegistry, ModelSpec};
use nonogram_bench::usage::NormalizedUsage;
use scoring::artifact::{raw_path_for, write_raw_records, ModelInfo, ResultsArtifact};
use scoring::corpus::{Puzzle, PuzzleCorpus, SizeLabel};
use scoring::history::{
    latest_per_pair, HistoryError, HistoryResult, JsonlHistoryStore, MemoryHistoryStore,
    RunHistory,
};
use scoring::record::{RunRecord, RunResult, RunStatus};
use tempfile::tempdir;

// ── Fixtures ────────────────────────────────────────────────────────

fn two_by_two() -> Vec<Puzzle> {
    vec![
        Puzzle::from_solution(2, 2, "1101"),
        Puzzle::from_solution(2, 2, "0110"),
        Puzzle::from_solution(2, 2, "1000"),
    ]
}

fn three_by_three() -> Vec<Puzzle> {
    vec![
        Puzzle::from_solution(3, 3, "101010101"),
        Puzzle::from_solution(3, 3, "111000111"),
    ]
}

/// Mixed sizes, deliberately listed largest first.
fn mixed_corpus() -> PuzzleCorpus {
    let mut puzzles = three_by_three();
    puzzles.extend(two_by_two());
    PuzzleCorpus::new(puzzles)
}

fn registry(names: &[&str]) -> ModelRegistry {
    ModelRegistry::new(
        names
            .iter()
            .map(|n| ModelSpec::new(*n, format!("test/{n}"), false))
            .collect(),
    )
    .expect("valid test registry")
}

fn usage() -> NormalizedUsage {
    NormalizedUsage {
        cost: 0.002,
        tokens: 250,
    }
}

// ── Scripted client ─────────────────────────────────────────────────

enum Script {
    Answer(String),
    Reject(String),
}

/// Answers from the corpus solutions unless a prompt has a scripted reply.
struct ScriptedClient {
    solutions: HashMap<String, String>,
    overrides: HashMap<String, Script>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn solving(corpus: &PuzzleCorpus) -> Self {
        Self {
            solutions: corpus
                .puzzles()
                .iter()
                .map(|p| (p.clues.canonical.clone(), p.solution.clone()))
                .collect(),
            overrides: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn with(mut self, puzzle: &Puzzle, script: Script) -> Self {
        self.overrides.insert(puzzle.clues.canonical.clone(), script);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let solution = match self.overrides.get(&request.prompt) {
            Some(Script::Reject(message)) => {
                return Err(CompletionError::Provider {
                    code: Some(429),
                    message: message.clone(),
                })
            }
            Some(Script::Answer(text)) => text.clone(),
            None => self
                .solutions
                .get(&request.prompt)
                .cloned()
                .ok_or_else(|| CompletionError::Configuration("unknown prompt".into()))?,
        };
        Ok(CompletionResponse {
            solution,
            usage: usage(),
        })
    }
}

/// Sleeps on every call and records the peak number of concurrent calls.
struct SlowClient {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl SlowClient {
    fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CompletionClient for SlowClient {
    async fn complete(
        &self,
        _request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(25)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(CompletionResponse {
            solution: String::new(),
            usage: NormalizedUsage::default(),
        })
    }
}

/// Reads fine, refuses every write.
struct ReadOnlyHistory;

#[async_trait]
impl RunHistory for ReadOnlyHistory {
    async fn append(&self, _record: &RunRecord) -> HistoryResult<()> {
        Err(HistoryError::Io {
            path: "read-only.jsonl".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }

    async fn load_all(&self) -> HistoryResult<Vec<RunRecord>> {
        Ok(Vec::new())
    }
}

mock! {
    pub Completion {}

    #[async_trait]
    impl CompletionClient for Completion {
        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, CompletionError>;
    }
}

fn orchestrator(
    client: Arc<dyn CompletionClient>,
    history: Arc<dyn RunHistory>,
    registry: ModelRegistry,
    corpus: PuzzleCorpus,
    options: RunOptions,
) -> BenchmarkOrchestrator {
    BenchmarkOrchestrator::new(client, history, registry, corpus, options)
}

// ── Failure isolation ───────────────────────────────────────────────

#[tokio::test]
async fn test_one_rejected_call_does_not_abort_the_matrix() {
    let corpus = mixed_corpus();
    let victim = corpus.puzzles()[1].clone();
    let client = Arc::new(
        ScriptedClient::solving(&corpus).with(&victim, Script::Reject("rate limited".into())),
    );
    let history = Arc::new(MemoryHistoryStore::new());

    let outcome = orchestrator(
        client.clone(),
        history.clone(),
        registry(&["m1", "m2"]),
        corpus.clone(),
        RunOptions::default(),
    )
    .run(Utc::now())
    .await
    .unwrap();

    // Both models hit the rejecting prompt.
    assert_eq!(outcome.results.len(), 2 * corpus.len());
    assert_eq!(client.calls(), 2 * corpus.len());
    assert_eq!(history.count().await.unwrap(), 2 * corpus.len());

    let failed: Vec<&RunResult> = outcome.results.iter().filter(|r| r.is_failed()).collect();
    assert_eq!(failed.len(), 2);
    for result in failed {
        assert_eq!(result.puzzle_id, victim.id);
        assert_eq!(result.status, RunStatus::Failed);
        assert!(!result.correct);
        assert_eq!(result.cost, 0.0);
        assert_eq!(result.tokens, 0);
        assert_eq!(result.error_message.as_deref(), Some("rate limited"));
    }

    let mut others = outcome.results.iter().filter(|r| !r.is_failed());
    assert!(others.clone().all(|r| r.correct));
    assert!(others.all(|r| r.tokens == 250));
}

#[tokio::test]
async fn test_results_are_grouped_in_registry_order() {
    let corpus = mixed_corpus();
    let outcome = orchestrator(
        Arc::new(ScriptedClient::solving(&corpus)),
        Arc::new(MemoryHistoryStore::new()),
        registry(&["zeta", "alpha"]),
        corpus.clone(),
        RunOptions::default(),
    )
    .run(Utc::now())
    .await
    .unwrap();

    let models: Vec<&str> = outcome.results.iter().map(|r| r.model.as_str()).collect();
    let split = corpus.len();
    assert!(models[..split].iter().all(|m| *m == "zeta"));
    assert!(models[split..].iter().all(|m| *m == "alpha"));
}

// ── Grading through the orchestrator ────────────────────────────────

#[tokio::test]
async fn test_near_miss_is_incorrect_but_successful() {
    let corpus = PuzzleCorpus::new(two_by_two());
    let exact = corpus.puzzles()[0].clone(); // 1101
    let near = corpus.puzzles()[1].clone(); // 0110
    let client = Arc::new(
        ScriptedClient::solving(&corpus)
            .with(&exact, Script::Answer("11\n01".into()))
            .with(&near, Script::Answer("0111".into())),
    );

    let outcome = orchestrator(
        client,
        Arc::new(MemoryHistoryStore::new()),
        registry(&["m1"]),
        corpus,
        RunOptions::default(),
    )
    .run(Utc::now())
    .await
    .unwrap();

    let by_id: HashMap<&str, &RunResult> = outcome
        .results
        .iter()
        .map(|r| (r.puzzle_id.as_str(), r))
        .collect();

    let whitespace = by_id[exact.id.as_str()];
    assert!(whitespace.correct);

    let miss = by_id[near.id.as_str()];
    assert!(!miss.correct);
    assert_eq!(miss.status, RunStatus::Success);
    assert!(miss.error_message.is_none());
    assert_eq!(miss.tokens, 250);
}

// ── Skip policy ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let corpus = mixed_corpus();
    let client = Arc::new(ScriptedClient::solving(&corpus));
    let history = Arc::new(MemoryHistoryStore::new());
    let bench = orchestrator(
        client.clone(),
        history.clone(),
        registry(&["m1", "m2"]),
        corpus.clone(),
        RunOptions::default(),
    );

    let first = bench.run(Utc::now()).await.unwrap();
    assert_eq!(first.results.len(), 2 * corpus.len());
    let calls_after_first = client.calls();
    let stored = history.count().await.unwrap();

    assert!(!bench.has_work_to_do(Utc::now()).await.unwrap());
    let second = bench.run(Utc::now()).await.unwrap();

    assert!(second.is_empty());
    assert_eq!(second.skipped, 2 * corpus.len());
    assert_eq!(client.calls(), calls_after_first);
    assert_eq!(history.count().await.unwrap(), stored);
}

#[tokio::test]
async fn test_second_run_at_the_same_instant_is_a_no_op() {
    let corpus = mixed_corpus();
    let client = Arc::new(ScriptedClient::solving(&corpus));
    let history = Arc::new(MemoryHistoryStore::new());
    let bench = orchestrator(
        client.clone(),
        history.clone(),
        registry(&["m1"]),
        corpus.clone(),
        RunOptions::default(),
    );

    let now = Utc::now();
    let first = bench.run(now).await.unwrap();
    assert_eq!(first.results.len(), corpus.len());
    assert_eq!(client.calls(), corpus.len());

    assert!(!bench.has_work_to_do(now).await.unwrap());
    let second = bench.run(now).await.unwrap();

    assert!(second.is_empty());
    assert_eq!(second.skipped, corpus.len());
    assert_eq!(client.calls(), corpus.len());
    assert_eq!(history.count().await.unwrap(), corpus.len());

    let records = history.load_all().await.unwrap();
    assert!(records.iter().all(|r| r.timestamp == now));
}

#[tokio::test]
async fn test_recent_pair_is_skipped_others_run() {
    let corpus = PuzzleCorpus::new(two_by_two());
    let p1 = corpus.puzzles()[0].clone();
    let ten_days_ago = Utc::now() - ChronoDuration::days(10);
    let history = Arc::new(MemoryHistoryStore::with_records(vec![RunRecord::new(
        "earlier",
        ten_days_ago,
        RunResult::success("m1", &p1.id, p1.size(), true, 0.0, 1, 1.0),
    )]));
    let client = Arc::new(ScriptedClient::solving(&corpus));

    let outcome = orchestrator(
        client.clone(),
        history,
        registry(&["m1", "m2"]),
        corpus.clone(),
        RunOptions::default(),
    )
    .run(Utc::now())
    .await
    .unwrap();

    assert_eq!(outcome.skipped, 1);
    assert_eq!(client.calls(), 2 * corpus.len() - 1);
    assert!(!outcome
        .results
        .iter()
        .any(|r| r.model == "m1" && r.puzzle_id == p1.id));
    assert!(outcome
        .results
        .iter()
        .any(|r| r.model == "m2" && r.puzzle_id == p1.id));
}

#[tokio::test]
async fn test_old_pair_is_due_again() {
    let corpus = PuzzleCorpus::new(two_by_two());
    let p1 = corpus.puzzles()[0].clone();
    let history = Arc::new(MemoryHistoryStore::with_records(vec![RunRecord::new(
        "earlier",
        Utc::now() - ChronoDuration::days(91),
        RunResult::success("m1", &p1.id, p1.size(), true, 0.0, 1, 1.0),
    )]));
    let client = Arc::new(ScriptedClient::solving(&corpus));

    let outcome = orchestrator(
        client.clone(),
        history,
        registry(&["m1"]),
        corpus.clone(),
        RunOptions::default(),
    )
    .run(Utc::now())
    .await
    .unwrap();

    assert_eq!(outcome.skipped, 0);
    assert_eq!(client.calls(), corpus.len());
}

#[tokio::test]
async fn test_empty_corpus_or_registry_makes_no_calls() {
    let client = Arc::new(ScriptedClient::solving(&PuzzleCorpus::new(Vec::new())));

    let no_puzzles = orchestrator(
        client.clone(),
        Arc::new(MemoryHistoryStore::new()),
        registry(&["m1"]),
        PuzzleCorpus::new(Vec::new()),
        RunOptions::default(),
    );
    assert!(!no_puzzles.has_work_to_do(Utc::now()).await.unwrap());
    assert!(no_puzzles.run(Utc::now()).await.unwrap().is_empty());

    let no_models = orchestrator(
        client.clone(),
        Arc::new(MemoryHistoryStore::new()),
        registry(&[]),
        mixed_corpus(),
        RunOptions::default(),
    );
    assert!(!no_models.has_work_to_do(Utc::now()).await.unwrap());
    assert!(no_models.run(Utc::now()).await.unwrap().is_empty());

    assert_eq!(client.calls(), 0);
}

// ── Ordering and concurrency ────────────────────────────────────────

#[tokio::test]
async fn test_sizes_run_smallest_first_per_model() {
    let corpus = mixed_corpus();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let bench = orchestrator(
        Arc::new(ScriptedClient::solving(&corpus)),
        Arc::new(MemoryHistoryStore::new()),
        registry(&["m1", "m2"]),
        corpus,
        RunOptions::default(),
    )
    .with_progress(tx);

    bench.run(Utc::now()).await.unwrap();
    drop(bench);

    let mut finished: HashMap<String, Vec<SizeLabel>> = HashMap::new();
    while let Some(event) = rx.recv().await {
        if let ProgressEvent::PuzzleFinished { model, size, .. } = event {
            finished.entry(model).or_default().push(size);
        }
    }

    let small = SizeLabel::new(2, 2);
    let large = SizeLabel::new(3, 3);
    for model in ["m1", "m2"] {
        let sizes = &finished[model];
        assert_eq!(sizes.len(), 5);
        assert!(sizes[..3].iter().all(|s| *s == small), "{model}: {sizes:?}");
        assert!(sizes[3..].iter().all(|s| *s == large), "{model}: {sizes:?}");
    }
}

#[tokio::test]
async fn test_sequential_mode_issues_one_call_at_a_time() {
    let client = Arc::new(SlowClient::new());
    let options = RunOptions {
        concurrency: Concurrency::Sequential,
        ..RunOptions::default()
    };

    orchestrator(
        client.clone(),
        Arc::new(MemoryHistoryStore::new()),
        registry(&["m1"]),
        PuzzleCorpus::new(two_by_two()),
        options,
    )
    .run(Utc::now())
    .await
    .unwrap();

    assert_eq!(client.calls.load(Ordering::SeqCst), 3);
    assert_eq!(client.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_parallel_mode_respects_the_per_model_cap() {
    let client = Arc::new(SlowClient::new());
    let options = RunOptions {
        max_parallel_per_model: 2,
        ..RunOptions::default()
    };

    orchestrator(
        client.clone(),
        Arc::new(MemoryHistoryStore::new()),
        registry(&["m1"]),
        PuzzleCorpus::new(two_by_two()),
        options,
    )
    .run(Utc::now())
    .await
    .unwrap();

    assert_eq!(client.calls.load(Ordering::SeqCst), 3);
    assert_eq!(client.peak.load(Ordering::SeqCst), 2);
}

// ── Persistence ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_history_write_failure_is_counted_not_fatal() {
    let corpus = PuzzleCorpus::new(two_by_two());
    let outcome = orchestrator(
        Arc::new(ScriptedClient::solving(&corpus)),
        Arc::new(ReadOnlyHistory),
        registry(&["m1"]),
        corpus.clone(),
        RunOptions::default(),
    )
    .run(Utc::now())
    .await
    .unwrap();

    assert_eq!(outcome.results.len(), corpus.len());
    assert_eq!(outcome.persist_failures, corpus.len());
    assert!(outcome.results.iter().all(|r| r.correct));
}

#[tokio::test]
async fn test_mocked_client_failure_becomes_failed_run() {
    let corpus = PuzzleCorpus::new(vec![Puzzle::from_solution(2, 2, "1101")]);
    let mut mock = MockCompletion::new();
    mock.expect_complete().times(1).returning(|_| {
        Err(CompletionError::Http {
            status: 502,
            body: "bad gateway".into(),
        })
    });

    let outcome = orchestrator(
        Arc::new(mock),
        Arc::new(MemoryHistoryStore::new()),
        registry(&["m1"]),
        corpus,
        RunOptions::default(),
    )
    .run(Utc::now())
    .await
    .unwrap();

    assert_eq!(outcome.results.len(), 1);
    let result = &outcome.results[0];
    assert!(result.is_failed());
    assert_eq!(
        result.error_message.as_deref(),
        Some("API error (502): bad gateway")
    );
}

#[tokio::test]
async fn test_jsonl_history_feeds_the_results_artifact() {
    let dir = tempdir().unwrap();
    let history_path = dir.path().join("history.jsonl");
    let results_path = dir.path().join("out").join("results.json");

    let corpus = mixed_corpus();
    let victim = corpus.puzzles()[0].clone();
    let history = Arc::new(JsonlHistoryStore::new(&history_path));
    orchestrator(
        Arc::new(
            ScriptedClient::solving(&corpus).with(&victim, Script::Reject("rate limited".into())),
        ),
        history.clone(),
        registry(&["m1"]),
        corpus.clone(),
        RunOptions::default(),
    )
    .run(Utc::now())
    .await
    .unwrap();

    // A fresh store over the same file sees every record.
    let records = JsonlHistoryStore::new(&history_path).load_all().await.unwrap();
    assert_eq!(records.len(), corpus.len());

    let selected = latest_per_pair(&records);
    let results: Vec<RunResult> = selected.iter().map(|r| r.result.clone()).collect();
    let artifact = ResultsArtifact::build(&results, &[ModelInfo::new("m1", false)], Utc::now());
    artifact.write_json(&results_path).unwrap();
    write_raw_records(&selected, &raw_path_for(&results_path)).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&results_path).unwrap()).unwrap();
    assert_eq!(json["summary"]["models"], serde_json::json!(["m1"]));
    assert_eq!(json["summary"]["sizes"], serde_json::json!(["2x2", "3x3"]));
    let model = &json["byModel"][0];
    assert_eq!(model["overallTotal"], 5);
    assert_eq!(model["overallCorrect"], 4);
    assert_eq!(model["overallFailed"], 1);
    assert_eq!(json["errorsByModel"][0]["errors"][0]["message"], "rate limited");

    let raw = std::fs::read_to_string(dir.path().join("out").join("results-raw.json")).unwrap();
    let raw: Vec<RunRecord> = serde_json::from_str(&raw).unwrap();
    assert_eq!(raw.len(), corpus.len());
}

