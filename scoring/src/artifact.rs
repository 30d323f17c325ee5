//! Aggregated results artifact
//!
//! The document handed to the presentation layer. It is rebuilt from scratch
//! on every export and written as a whole file; nothing is patched in place.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::{self, ModelErrors, SizeStats};
use crate::corpus::SizeLabel;
use crate::record::{RunRecord, RunResult};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What the artifact needs to know about a registered model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub reasoning: bool,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>, reasoning: bool) -> Self {
        Self {
            name: name.into(),
            reasoning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub models: Vec<String>,
    pub sizes: Vec<SizeLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeRollup {
    pub size: SizeLabel,
    pub accuracy: f64,
    pub correct: usize,
    pub failed: usize,
    pub total: usize,
    pub runs: usize,
    pub avg_duration_ms: f64,
    pub total_duration_ms: f64,
    pub avg_tokens: f64,
    pub total_tokens: u64,
    pub avg_cost: f64,
    pub total_cost: f64,
}

impl SizeRollup {
    fn from_stats(size: SizeLabel, stats: &SizeStats) -> Self {
        Self {
            size,
            accuracy: stats.accuracy(),
            correct: stats.correct_count,
            failed: stats.failed_count,
            total: stats.total_puzzles,
            runs: stats.runs(),
            avg_duration_ms: stats.avg_duration(),
            total_duration_ms: stats.total_duration,
            avg_tokens: stats.avg_tokens(),
            total_tokens: stats.total_tokens,
            avg_cost: stats.avg_cost(),
            total_cost: stats.total_cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRollup {
    pub model: String,
    pub reasoning: bool,
    pub overall_accuracy: f64,
    pub overall_correct: usize,
    pub overall_failed: usize,
    pub overall_total: usize,
    pub overall_runs: usize,
    pub by_size: Vec<SizeRollup>,
}

/// One flat chart row: `model` repeated on every size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub model: String,
    pub reasoning: bool,
    #[serde(flatten)]
    pub stats: SizeRollup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsArtifact {
    pub timestamp: DateTime<Utc>,
    pub summary: ArtifactSummary,
    pub by_model: Vec<ModelRollup>,
    pub chart_data: Vec<ChartPoint>,
    pub errors_by_model: Vec<ModelErrors>,
}

impl ResultsArtifact {
    /// Build the artifact from the selected results.
    ///
    /// Models follow `registry` order. Models that appear only in `results`
    /// are appended alphabetically with `reasoning = false`. Registered
    /// models without any results are left out.
    pub fn build(results: &[RunResult], registry: &[ModelInfo], timestamp: DateTime<Utc>) -> Self {
        let stats = aggregate::stats_by_model_and_size(results);

        let registered: BTreeSet<&str> = registry.iter().map(|m| m.name.as_str()).collect();
        let mut ordered: Vec<ModelInfo> = registry
            .iter()
            .filter(|m| stats.contains_key(&m.name))
            .cloned()
            .collect();
        // BTreeMap keys are already alphabetical.
        ordered.extend(
            stats
                .keys()
                .filter(|name| !registered.contains(name.as_str()))
                .map(|name| ModelInfo::new(name.clone(), false)),
        );

        let mut by_model = Vec::with_capacity(ordered.len());
        let mut chart_data = Vec::new();
        for info in &ordered {
            let Some(by_size) = stats.get(&info.name) else {
                continue;
            };
            let Some(totals) = aggregate::model_totals(by_size) else {
                continue;
            };

            let rollups: Vec<SizeRollup> = by_size
                .iter()
                .filter(|(_, s)| !s.is_empty())
                .map(|(size, s)| SizeRollup::from_stats(*size, s))
                .collect();

            chart_data.extend(rollups.iter().map(|r| ChartPoint {
                model: info.name.clone(),
                reasoning: info.reasoning,
                stats: r.clone(),
            }));

            by_model.push(ModelRollup {
                model: info.name.clone(),
                reasoning: info.reasoning,
                overall_accuracy: totals.accuracy(),
                overall_correct: totals.correct_count,
                overall_failed: totals.failed_count,
                overall_total: totals.total_puzzles,
                overall_runs: totals.runs(),
                by_size: rollups,
            });
        }

        Self {
            timestamp,
            summary: ArtifactSummary {
                models: by_model.iter().map(|m| m.model.clone()).collect(),
                sizes: aggregate::sizes(results),
            },
            by_model,
            chart_data,
            errors_by_model: aggregate::errors_by_model(results),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ArtifactError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace `path` with the pretty-printed artifact.
    pub fn write_json(&self, path: &Path) -> Result<(), ArtifactError> {
        write_whole_file(path, &self.to_json_pretty()?)
    }
}

/// Dump the selected raw records next to the artifact.
pub fn write_raw_records(records: &[RunRecord], path: &Path) -> Result<(), ArtifactError> {
    write_whole_file(path, &serde_json::to_string_pretty(records)?)
}

/// `results.json` -> `results-raw.json`.
pub fn raw_path_for(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "json".to_string());
    path.with_file_name(format!("{stem}-raw.{ext}"))
}

fn write_whole_file(path: &Path, contents: &str) -> Result<(), ArtifactError> {
    let err = |source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(err)?;
    }
    std::fs::write(path, contents).map_err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(model: &str, size: (u32, u32), correct: bool) -> RunResult {
        RunResult::success(
            model,
            "p",
            SizeLabel::new(size.0, size.1),
            correct,
            0.001,
            100,
            1000.0,
        )
    }

    fn registry() -> Vec<ModelInfo> {
        vec![ModelInfo::new("zz-first", true), ModelInfo::new("aa-second", false)]
    }

    #[test]
    fn registry_order_then_extras_alphabetical() {
        let results = vec![
            run("aa-second", (5, 5), true),
            run("unlisted-b", (5, 5), true),
            run("zz-first", (5, 5), false),
            run("unlisted-a", (5, 5), false),
        ];
        let artifact = ResultsArtifact::build(&results, &registry(), Utc::now());
        assert_eq!(
            artifact.summary.models,
            vec!["zz-first", "aa-second", "unlisted-a", "unlisted-b"]
        );
        assert!(artifact.by_model[0].reasoning);
        assert!(!artifact.by_model[2].reasoning);
    }

    #[test]
    fn registered_models_without_results_are_omitted() {
        let artifact = ResultsArtifact::build(&[run("aa-second", (5, 5), true)], &registry(), Utc::now());
        assert_eq!(artifact.summary.models, vec!["aa-second"]);
    }

    #[test]
    fn by_size_and_chart_data_agree() {
        let results = vec![
            run("zz-first", (10, 10), true),
            run("zz-first", (5, 5), true),
            run("zz-first", (5, 5), false),
            RunResult::failed("zz-first", "p", SizeLabel::new(5, 5), 10.0, "boom"),
        ];
        let artifact = ResultsArtifact::build(&results, &registry(), Utc::now());
        let model = &artifact.by_model[0];
        assert_eq!(model.overall_total, 4);
        assert_eq!(model.overall_correct, 2);
        assert_eq!(model.overall_failed, 1);
        assert_eq!(model.overall_runs, 3);
        assert_eq!(model.by_size[0].size, SizeLabel::new(5, 5));
        assert_eq!(model.by_size[0].failed, 1);
        assert_eq!(artifact.chart_data.len(), 2);
        assert_eq!(artifact.summary.sizes, vec![SizeLabel::new(5, 5), SizeLabel::new(10, 10)]);
        assert_eq!(artifact.errors_by_model[0].errors[0].message, "boom");
    }

    #[test]
    fn json_shape_is_camel_case() {
        let artifact = ResultsArtifact::build(&[run("zz-first", (5, 5), true)], &registry(), Utc::now());
        let json = serde_json::to_value(&artifact).unwrap();
        assert!(json["byModel"][0]["overallAccuracy"].is_number());
        assert_eq!(json["byModel"][0]["bySize"][0]["size"], "5x5");
        assert_eq!(json["chartData"][0]["model"], "zz-first");
        assert!(json["chartData"][0]["avgDurationMs"].is_number());
        assert_eq!(json["summary"]["sizes"][0], "5x5");
    }

    #[test]
    fn raw_path_inserts_suffix() {
        assert_eq!(
            raw_path_for(Path::new("out/results.json")),
            PathBuf::from("out/results-raw.json")
        );
    }

    #[test]
    fn write_json_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("results.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale").unwrap();

        let artifact = ResultsArtifact::build(&[run("zz-first", (5, 5), true)], &registry(), Utc::now());
        artifact.write_json(&path).unwrap();

        let back: ResultsArtifact =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.summary, artifact.summary);
    }
}
