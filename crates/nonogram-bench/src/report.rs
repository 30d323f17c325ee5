//! Console reporting.
//!
//! Box-drawing tables without an index column, plus the plain-text session
//! summary. Everything here renders to `String`; printing is left to `main`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use scoring::aggregate::{self, GlobalSummary, ModelRanking, SizeStats};
use scoring::corpus::{PuzzleCorpus, SizeLabel};
use scoring::record::RunResult;
use scoring::skip_policy::SkipPolicy;

use crate::registry::ModelRegistry;

const RULE_WIDTH: usize = 60;

// ── Formatting helpers ──────────────────────────────────────────────

/// `1234567` -> `1,234,567`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Round to the nearest integer and group digits.
pub fn rounded(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return "0".to_string();
    }
    thousands(value.round() as u64)
}

pub fn percent(value: f64) -> String {
    format!("{value:.2}%")
}

pub fn millis(value: f64) -> String {
    format!("{}ms", rounded(value))
}

pub fn dollars(value: f64) -> String {
    format!("${value:.5}")
}

pub fn rule(title: &str) -> String {
    let bar = "=".repeat(RULE_WIDTH);
    format!("{bar}\n{title}\n{bar}")
}

// ── Table ───────────────────────────────────────────────────────────

/// A left-aligned text table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Missing trailing cells render empty; extra cells are dropped.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| -> String {
            let inner: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!(" {c:<w$} "))
                .collect();
            format!("│{}│", inner.join("│"))
        };
        let sep: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        let sep = sep.join("┼");
        let span = sep.chars().count();

        let mut out = Vec::with_capacity(self.rows.len() + 4);
        out.push(format!("┌{}┐", "─".repeat(span)));
        out.push(line(&self.headers));
        out.push(format!("├{sep}┤"));
        for row in &self.rows {
            out.push(line(row));
        }
        out.push(format!("└{}┘", "─".repeat(span)));
        out.join("\n")
    }
}

// ── Benchmark tables ────────────────────────────────────────────────

fn size_row(label: String, stats: &SizeStats) -> Vec<String> {
    vec![
        label,
        stats.total_puzzles.to_string(),
        stats.correct_count.to_string(),
        stats.failed_count.to_string(),
        percent(stats.accuracy()),
        millis(stats.avg_duration()),
        rounded(stats.avg_tokens()),
        thousands(stats.total_tokens),
        dollars(stats.avg_cost()),
        dollars(stats.total_cost),
    ]
}

/// Per-size table for one model with a trailing TOTAL row.
pub fn model_size_table(by_size: &BTreeMap<SizeLabel, SizeStats>) -> Table {
    let mut table = Table::new([
        "Size",
        "Puzzles",
        "Correct",
        "Failed",
        "Accuracy",
        "Avg Time",
        "Avg Tokens",
        "Total Tokens",
        "Avg Cost",
        "Total Cost",
    ]);
    for (size, stats) in by_size.iter().filter(|(_, s)| !s.is_empty()) {
        table.push_row(size_row(size.to_string(), stats));
    }
    if let Some(totals) = aggregate::model_totals(by_size) {
        table.push_row(size_row("TOTAL".to_string(), &totals));
    }
    table
}

pub fn ranking_table(ranking: &[ModelRanking]) -> Table {
    let mut table = Table::new([
        "Rank",
        "Model",
        "Accuracy",
        "Avg Tokens",
        "Avg Time",
        "Avg Cost",
        "Total Cost",
    ]);
    for (i, entry) in ranking.iter().enumerate() {
        table.push_row([
            (i + 1).to_string(),
            entry.model.clone(),
            percent(entry.accuracy),
            rounded(entry.avg_tokens),
            millis(entry.avg_time_ms),
            dollars(entry.avg_cost),
            dollars(entry.total_cost),
        ]);
    }
    table
}

pub fn format_global_summary(summary: &GlobalSummary) -> String {
    let lines = [
        format!("Total Runs:       {}", thousands(summary.total_runs as u64)),
        format!(
            "Total Correct:    {} ({})",
            thousands(summary.total_correct as u64),
            percent(summary.correct_pct())
        ),
        format!(
            "Total Failed:     {} ({})",
            thousands(summary.total_failed as u64),
            percent(summary.failed_pct())
        ),
        format!(
            "Total Run Time:   {:.2}s ({})",
            summary.total_duration_ms / 1000.0,
            millis(summary.total_duration_ms)
        ),
        format!("Total Tokens:     {}", thousands(summary.total_tokens)),
        format!("Total Cost:       {}", dollars(summary.total_cost)),
    ];
    lines.join("\n")
}

/// Full end-of-session report: one table per model in registry order, the
/// ranking and the global summary. Empty input renders an empty string.
pub fn session_report(results: &[RunResult], registry: &ModelRegistry) -> String {
    if results.is_empty() {
        return String::new();
    }

    let stats = aggregate::stats_by_model_and_size(results);
    let mut ordered: Vec<&str> = registry
        .names()
        .filter(|name| stats.contains_key(*name))
        .collect();
    ordered.extend(
        stats
            .keys()
            .map(String::as_str)
            .filter(|name| registry.get(name).is_none()),
    );

    let mut sections = vec![rule("BENCHMARK RESULTS")];
    for name in ordered {
        let table = model_size_table(&stats[name]);
        if !table.is_empty() {
            sections.push(format!("\n=== Model: {name} ===\n{}", table.render()));
        }
    }

    let ranking = aggregate::model_ranking(results);
    if !ranking.is_empty() {
        sections.push(format!(
            "\n{}\n{}",
            rule("MODEL RANKING (by accuracy) - This Session"),
            ranking_table(&ranking).render()
        ));
    }

    sections.push(format!(
        "\n{}\n{}\n{}",
        rule("SESSION SUMMARY"),
        format_global_summary(&aggregate::global_summary(results)),
        "=".repeat(RULE_WIDTH)
    ));

    sections.join("\n")
}

// ── CLI listings ────────────────────────────────────────────────────

pub fn puzzles_table(corpus: &PuzzleCorpus) -> Table {
    let mut table = Table::new(["Size", "Id", "Cells", "Filled"]);
    for (size, puzzles) in corpus.size_groups() {
        for puzzle in puzzles {
            let filled = puzzle.solution.chars().filter(|c| *c == '1').count();
            table.push_row([
                size.to_string(),
                puzzle.id.clone(),
                puzzle.cell_count().to_string(),
                filled.to_string(),
            ]);
        }
    }
    table
}

pub fn models_table(registry: &ModelRegistry) -> Table {
    let mut table = Table::new(["Model", "Route", "Reasoning", "Effort", "Provider"]);
    for model in registry.models() {
        let effort = model
            .reasoning_config
            .as_ref()
            .map(|r| match (r.effort, r.enabled) {
                (Some(e), _) => e.to_string(),
                (None, Some(true)) => "on".to_string(),
                (None, Some(false)) => "off".to_string(),
                (None, None) => "-".to_string(),
            })
            .unwrap_or_else(|| "-".to_string());
        let provider = model
            .provider
            .as_ref()
            .filter(|p| !p.only.is_empty())
            .map(|p| p.only.join(","))
            .unwrap_or_else(|| "-".to_string());
        table.push_row([
            model.name.clone(),
            model.route.clone(),
            if model.reasoning { "yes" } else { "no" }.to_string(),
            effort,
            provider,
        ]);
    }
    table
}

/// Recent vs pending pairs per model as of `now`.
pub fn status_table(
    registry: &ModelRegistry,
    corpus: &PuzzleCorpus,
    policy: &SkipPolicy,
    now: DateTime<Utc>,
) -> Table {
    let mut headers = vec!["Model".to_string()];
    let sizes = corpus.sizes();
    headers.extend(sizes.iter().map(|s| format!("{s} pending")));
    headers.push("Recent".to_string());
    headers.push("Pending".to_string());

    let groups = corpus.size_groups();
    let mut table = Table::new(headers);
    for name in registry.names() {
        let mut row = vec![name.to_string()];
        let mut pending_total = 0;
        for size in &sizes {
            let group = groups.get(size).map(Vec::as_slice).unwrap_or_default();
            let pending = policy.pending(name, group, now).len();
            pending_total += pending;
            row.push(format!("{pending}/{}", group.len()));
        }
        row.push((corpus.len() - pending_total).to_string());
        row.push(pending_total.to_string());
        table.push_row(row);
    }
    table
}
