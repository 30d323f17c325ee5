//! Result aggregation
//!
//! Pure reductions over a flat list of [`RunResult`]s:
//! - per (model, size) accumulation into [`SizeStats`]
//! - per-model totals and the accuracy leaderboard
//! - a global summary with no grouping
//! - failure messages grouped per model
//!
//! Nothing here keeps state between calls. The same input always produces the
//! same output, and empty groups are skipped rather than divided by.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::corpus::SizeLabel;
use crate::record::RunResult;

/// Accumulated totals for one model in one size bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeStats {
    pub total_puzzles: usize,
    pub correct_count: usize,
    pub failed_count: usize,
    pub total_duration: f64,
    pub total_tokens: u64,
    pub total_cost: f64,
}

impl SizeStats {
    /// Fold one run into the totals.
    pub fn record(&mut self, result: &RunResult) {
        self.total_puzzles += 1;
        if result.correct {
            self.correct_count += 1;
        }
        if result.is_failed() {
            self.failed_count += 1;
        }
        self.total_duration += result.duration_ms;
        self.total_tokens += result.tokens;
        self.total_cost += result.cost;
    }

    pub fn merge(&mut self, other: &SizeStats) {
        self.total_puzzles += other.total_puzzles;
        self.correct_count += other.correct_count;
        self.failed_count += other.failed_count;
        self.total_duration += other.total_duration;
        self.total_tokens += other.total_tokens;
        self.total_cost += other.total_cost;
    }

    pub fn is_empty(&self) -> bool {
        self.total_puzzles == 0
    }

    /// Runs that returned an answer (total minus failed).
    pub fn runs(&self) -> usize {
        self.total_puzzles - self.failed_count
    }

    fn per_puzzle(&self, value: f64) -> f64 {
        if self.total_puzzles == 0 {
            0.0
        } else {
            value / self.total_puzzles as f64
        }
    }

    /// Percentage correct, 0-100.
    pub fn accuracy(&self) -> f64 {
        self.per_puzzle(self.correct_count as f64) * 100.0
    }

    pub fn avg_duration(&self) -> f64 {
        self.per_puzzle(self.total_duration)
    }

    pub fn avg_tokens(&self) -> f64 {
        self.per_puzzle(self.total_tokens as f64)
    }

    pub fn avg_cost(&self) -> f64 {
        self.per_puzzle(self.total_cost)
    }
}

/// model -> size -> totals. Sizes iterate ascending.
pub type StatsByModel = BTreeMap<String, BTreeMap<SizeLabel, SizeStats>>;

/// Group results by `(model, size)` and accumulate.
pub fn stats_by_model_and_size(results: &[RunResult]) -> StatsByModel {
    let mut stats: StatsByModel = BTreeMap::new();
    for result in results {
        stats
            .entry(result.model.clone())
            .or_default()
            .entry(result.size)
            .or_default()
            .record(result);
    }
    stats
}

/// Sum across every size bucket of one model. `None` if the model has no runs.
pub fn model_totals(by_size: &BTreeMap<SizeLabel, SizeStats>) -> Option<SizeStats> {
    let mut totals = SizeStats::default();
    for stats in by_size.values().filter(|s| !s.is_empty()) {
        totals.merge(stats);
    }
    (!totals.is_empty()).then_some(totals)
}

/// Distinct sizes across all results, ascending.
pub fn sizes(results: &[RunResult]) -> Vec<SizeLabel> {
    let mut sizes: Vec<SizeLabel> = results.iter().map(|r| r.size).collect();
    sizes.sort();
    sizes.dedup();
    sizes
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRanking {
    pub model: String,
    pub accuracy: f64,
    pub avg_tokens: f64,
    pub avg_time_ms: f64,
    pub avg_cost: f64,
    pub total_cost: f64,
    pub total_puzzles: usize,
}

/// Leaderboard sorted by accuracy descending, then model name ascending.
pub fn model_ranking(results: &[RunResult]) -> Vec<ModelRanking> {
    let mut ranking: Vec<ModelRanking> = stats_by_model_and_size(results)
        .iter()
        .filter_map(|(model, by_size)| {
            let totals = model_totals(by_size)?;
            Some(ModelRanking {
                model: model.clone(),
                accuracy: totals.accuracy(),
                avg_tokens: totals.avg_tokens(),
                avg_time_ms: totals.avg_duration(),
                avg_cost: totals.avg_cost(),
                total_cost: totals.total_cost,
                total_puzzles: totals.total_puzzles,
            })
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.accuracy
            .total_cmp(&a.accuracy)
            .then_with(|| a.model.cmp(&b.model))
    });
    ranking
}

/// Ungrouped totals over every run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSummary {
    pub total_runs: usize,
    pub total_correct: usize,
    pub total_failed: usize,
    pub total_duration_ms: f64,
    pub total_tokens: u64,
    pub total_cost: f64,
}

impl GlobalSummary {
    fn pct(&self, n: usize) -> f64 {
        if self.total_runs == 0 {
            0.0
        } else {
            n as f64 / self.total_runs as f64 * 100.0
        }
    }

    pub fn correct_pct(&self) -> f64 {
        self.pct(self.total_correct)
    }

    pub fn failed_pct(&self) -> f64 {
        self.pct(self.total_failed)
    }
}

pub fn global_summary(results: &[RunResult]) -> GlobalSummary {
    results
        .iter()
        .fold(GlobalSummary::default(), |mut acc, r| {
            acc.total_runs += 1;
            acc.total_correct += usize::from(r.correct);
            acc.total_failed += usize::from(r.is_failed());
            acc.total_duration_ms += r.duration_ms;
            acc.total_tokens += r.tokens;
            acc.total_cost += r.cost;
            acc
        })
}

/// A distinct failure message and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCount {
    pub message: String,
    pub count: usize,
}

/// Failure messages of one model, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelErrors {
    pub model: String,
    pub total_errors: usize,
    pub errors: Vec<ErrorCount>,
}

/// Group failed runs by model and message. Models with no failures are omitted.
pub fn errors_by_model(results: &[RunResult]) -> Vec<ModelErrors> {
    let mut grouped: BTreeMap<&str, HashMap<&str, usize>> = BTreeMap::new();
    for result in results.iter().filter(|r| r.is_failed()) {
        let message = result.error_message.as_deref().unwrap_or("unknown error");
        *grouped
            .entry(result.model.as_str())
            .or_default()
            .entry(message)
            .or_insert(0) += 1;
    }

    grouped
        .into_iter()
        .map(|(model, messages)| {
            let mut errors: Vec<ErrorCount> = messages
                .into_iter()
                .map(|(message, count)| ErrorCount {
                    message: message.to_string(),
                    count,
                })
                .collect();
            errors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.message.cmp(&b.message)));
            ModelErrors {
                model: model.to_string(),
                total_errors: errors.iter().map(|e| e.count).sum(),
                errors,
            }
        })
        .collect()
}
