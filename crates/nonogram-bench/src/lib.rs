//! Nonogram LLM benchmark runner
//!
//! Sends every puzzle of the corpus to every registered model, grades the
//! answers, appends each result to the run history as soon as it lands and
//! rolls the history up into console tables and a `results.json` artifact.
//!
//! # Modules
//!
//! - `config`: environment-backed runtime settings
//! - `registry`: the models under test and their request options
//! - `client`: the completion seam and the OpenRouter implementation
//! - `usage`: provider-specific cost and token extraction
//! - `prompts`: the puzzle-solving system instruction
//! - `orchestrator`: bounded fan-out over the model × puzzle matrix
//! - `report`: console tables
//!
//! # Usage
//!
//! ```bash
//! # Benchmark everything not tested in the last 90 days
//! OPENROUTER_API_KEY=... nonogram-bench run
//!
//! # Two models, one call at a time, 5x5 only
//! nonogram-bench --model kimi-k2 --model grok-4 --size 5x5 run --sequential
//!
//! # Rebuild results.json from the history without calling anything
//! nonogram-bench export
//! ```

pub mod client;
pub mod config;
pub mod orchestrator;
pub mod prompts;
pub mod registry;
pub mod report;
pub mod usage;

pub use client::{CompletionClient, CompletionError, CompletionRequest, CompletionResponse};
pub use config::{BenchConfig, Concurrency};
pub use orchestrator::{BenchmarkOrchestrator, BenchmarkOutcome, ProgressEvent, RunOptions};
pub use registry::{ModelFilter, ModelRegistry, ModelSpec};
