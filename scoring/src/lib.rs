//! Nonogram benchmark scoring library
//!
//! Everything in the benchmark that does not touch the network:
//! - `corpus`: the immutable puzzle set, clue checking and stable puzzle ids
//! - `grading`: whitespace-insensitive exact-match grading and answer parsing
//! - `record`: the `RunResult` / `RunRecord` data model
//! - `history`: the append-only run log (JSONL on disk, or in memory)
//! - `skip_policy`: which (model, puzzle) pairs were tested recently enough to skip
//! - `aggregate`: pure rollups by model and size, ranking and global summary
//! - `artifact`: the `results.json` document consumed by the dashboard
//!
//! The orchestration layer and the HTTP client live in the `nonogram-bench`
//! crate and depend on this one.

pub mod aggregate;
pub mod artifact;
pub mod corpus;
pub mod grading;
pub mod history;
pub mod record;
pub mod skip_policy;

pub use aggregate::{GlobalSummary, ModelRanking, SizeStats};
pub use artifact::{ModelInfo, ResultsArtifact};
pub use corpus::{Puzzle, PuzzleCorpus, SizeLabel};
pub use grading::{grade, normalize, parse_solution, SolutionPayload};
pub use history::{JsonlHistoryStore, MemoryHistoryStore, RunHistory, SharedHistory};
pub use record::{RunRecord, RunResult, RunStatus};
pub use skip_policy::{FailedRunPolicy, SkipPolicy, DEFAULT_RERUN_THRESHOLD_DAYS};
