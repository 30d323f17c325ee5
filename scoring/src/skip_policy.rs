//! Skip policy
//!
//! Decides which (model, puzzle) pairs can be skipped because they were
//! benchmarked within the re-run threshold. The policy is built once from a
//! snapshot of the history and is read-only afterwards.
//!
//! Only the most recent run of a pair matters: older stale runs never count
//! once a fresh one exists, and repeated attempts do not accumulate.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::corpus::Puzzle;
use crate::record::RunRecord;

/// Default re-run threshold in days.
pub const DEFAULT_RERUN_THRESHOLD_DAYS: i64 = 90;

/// Whether failed runs count as "recently tested".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedRunPolicy {
    /// Any run, failed or not, suppresses re-testing inside the window.
    #[default]
    CountAsTested,
    /// Failed runs are ignored, so transient failures get retried.
    Retry,
}

/// Snapshot of the latest run per pair plus the recency threshold.
#[derive(Debug, Clone)]
pub struct SkipPolicy {
    threshold: Duration,
    latest: HashMap<(String, String), DateTime<Utc>>,
}

impl SkipPolicy {
    /// A policy with no history; nothing is skipped.
    pub fn empty(threshold_days: i64) -> Self {
        Self {
            threshold: Duration::days(threshold_days.max(0)),
            latest: HashMap::new(),
        }
    }

    pub fn from_records(
        records: &[RunRecord],
        threshold_days: i64,
        failed_runs: FailedRunPolicy,
    ) -> Self {
        let mut policy = Self::empty(threshold_days);
        for record in records {
            if failed_runs == FailedRunPolicy::Retry && record.result.is_failed() {
                continue;
            }
            policy.observe(&record.result.model, &record.result.puzzle_id, record.timestamp);
        }
        policy
    }

    fn observe(&mut self, model: &str, puzzle_id: &str, at: DateTime<Utc>) {
        self.latest
            .entry((model.to_string(), puzzle_id.to_string()))
            .and_modify(|ts| {
                if at > *ts {
                    *ts = at;
                }
            })
            .or_insert(at);
    }

    pub fn threshold_days(&self) -> i64 {
        self.threshold.num_days()
    }

    /// True when the latest run of the pair lies within `[now - threshold, now]`.
    pub fn recently_tested(&self, model: &str, puzzle_id: &str, now: DateTime<Utc>) -> bool {
        self.latest
            .get(&(model.to_string(), puzzle_id.to_string()))
            .is_some_and(|&ts| ts >= now - self.threshold && ts <= now)
    }

    /// Puzzles from `puzzles` that still need a run for `model`.
    pub fn pending<'a>(
        &self,
        model: &str,
        puzzles: &[&'a Puzzle],
        now: DateTime<Utc>,
    ) -> Vec<&'a Puzzle> {
        puzzles
            .iter()
            .copied()
            .filter(|p| !self.recently_tested(model, &p.id, now))
            .collect()
    }

    /// True iff at least one pair in the matrix is not recently tested.
    ///
    /// Vacuously false for an empty model list or an empty corpus.
    pub fn has_work_to_do<'m>(
        &self,
        models: impl IntoIterator<Item = &'m str>,
        puzzles: &[Puzzle],
        now: DateTime<Utc>,
    ) -> bool {
        models.into_iter().any(|model| {
            puzzles
                .iter()
                .any(|p| !self.recently_tested(model, &p.id, now))
        })
    }

    /// Recently tested puzzle count per model, for start-up logging.
    pub fn recent_counts(&self, now: DateTime<Utc>) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for (model, puzzle_id) in self.latest.keys() {
            if self.recently_tested(model, puzzle_id, now) {
                *counts.entry(model.clone()).or_insert(0) += 1;
            }
        }
        counts
    }
}
