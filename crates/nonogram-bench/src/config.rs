//! Runtime configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (applied by `main`)
//! 2. Environment variables (`NONOGRAM_BENCH_*`, `OPENROUTER_API_KEY`)
//! 3. Built-in defaults below

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use scoring::skip_policy::{FailedRunPolicy, DEFAULT_RERUN_THRESHOLD_DAYS};
use serde::{Deserialize, Serialize};

/// OpenRouter's OpenAI-compatible API root.
pub const DEFAULT_API_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_HISTORY_PATH: &str = "bench-history.jsonl";
const DEFAULT_RESULTS_PATH: &str = "results.json";
/// Per-model cap on in-flight completion calls.
pub const DEFAULT_MAX_PARALLEL_PER_MODEL: usize = 10;
/// Output budget per call, large enough for long reasoning traces.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 32_000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 600;

const ENV_API_URL: &str = "NONOGRAM_BENCH_API_URL";
const ENV_API_KEY: &str = "OPENROUTER_API_KEY";
const ENV_HISTORY_PATH: &str = "NONOGRAM_BENCH_HISTORY";
const ENV_RESULTS_PATH: &str = "NONOGRAM_BENCH_RESULTS";
const ENV_THRESHOLD_DAYS: &str = "NONOGRAM_BENCH_RERUN_DAYS";
const ENV_MAX_PARALLEL: &str = "NONOGRAM_BENCH_MAX_PARALLEL";
const ENV_MAX_OUTPUT_TOKENS: &str = "NONOGRAM_BENCH_MAX_OUTPUT_TOKENS";
const ENV_TIMEOUT_SECS: &str = "NONOGRAM_BENCH_TIMEOUT_SECS";
const ENV_CONCURRENCY: &str = "NONOGRAM_BENCH_CONCURRENCY";

/// How puzzles inside one size group are issued for a single model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Concurrency {
    /// One call at a time per model.
    Sequential,
    /// Up to the model's parallel cap at once.
    #[default]
    Parallel,
}

impl FromStr for Concurrency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(Self::Sequential),
            "parallel" | "par" => Ok(Self::Parallel),
            other => bail!("unknown concurrency mode '{other}' (expected sequential or parallel)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub api_base_url: String,
    /// Bearer token for the completion API. Only required by `run`.
    pub api_key: Option<String>,
    pub history_path: PathBuf,
    pub results_path: PathBuf,
    pub rerun_threshold_days: i64,
    pub max_parallel_per_model: usize,
    pub max_output_tokens: u32,
    pub request_timeout_secs: u64,
    pub concurrency: Concurrency,
    pub failed_runs: FailedRunPolicy,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            results_path: PathBuf::from(DEFAULT_RESULTS_PATH),
            rerun_threshold_days: DEFAULT_RERUN_THRESHOLD_DAYS,
            max_parallel_per_model: DEFAULT_MAX_PARALLEL_PER_MODEL,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            concurrency: Concurrency::default(),
            failed_runs: FailedRunPolicy::default(),
        }
    }
}

impl BenchConfig {
    /// Defaults overlaid with any environment overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        config.api_key = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty());
        if let Some(path) = lookup(ENV_HISTORY_PATH) {
            config.history_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_RESULTS_PATH) {
            config.results_path = PathBuf::from(path);
        }
        if let Some(days) = lookup(ENV_THRESHOLD_DAYS) {
            config.rerun_threshold_days = days
                .parse()
                .with_context(|| format!("{ENV_THRESHOLD_DAYS}={days} is not an integer"))?;
        }
        if let Some(n) = lookup(ENV_MAX_PARALLEL) {
            config.max_parallel_per_model = n
                .parse()
                .with_context(|| format!("{ENV_MAX_PARALLEL}={n} is not an integer"))?;
        }
        if let Some(n) = lookup(ENV_MAX_OUTPUT_TOKENS) {
            config.max_output_tokens = n
                .parse()
                .with_context(|| format!("{ENV_MAX_OUTPUT_TOKENS}={n} is not an integer"))?;
        }
        if let Some(n) = lookup(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = n
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS}={n} is not an integer"))?;
        }
        if let Some(mode) = lookup(ENV_CONCURRENCY) {
            config.concurrency = mode.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rerun_threshold_days < 0 {
            bail!("re-run threshold must be non-negative, got {}", self.rerun_threshold_days);
        }
        if self.max_parallel_per_model == 0 {
            bail!("max parallel calls per model must be at least 1");
        }
        if self.max_output_tokens == 0 {
            bail!("max output tokens must be at least 1");
        }
        Ok(())
    }

    /// The key, or a readable error naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .with_context(|| format!("{ENV_API_KEY} is not set"))
    }
}
