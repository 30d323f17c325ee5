//! Run records
//!
//! A [`RunResult`] is the graded outcome of one (model, puzzle) completion
//! attempt. A [`RunRecord`] wraps it with the identity and timestamp it is
//! persisted under.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::corpus::SizeLabel;

/// Outcome of the completion call itself (not of the grading).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// The model returned a parsable answer (right or wrong).
    Success,
    /// The call failed: transport, provider or malformed output.
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Graded outcome of a single completion attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub model: String,
    pub puzzle_id: String,
    pub size: SizeLabel,
    pub correct: bool,
    /// Cost in USD; zero when unavailable or failed.
    pub cost: f64,
    /// Output tokens, including reasoning tokens where the provider reports them separately.
    pub tokens: u64,
    pub duration_ms: f64,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl RunResult {
    /// A completed call. `cost` is clamped to be non-negative.
    pub fn success(
        model: impl Into<String>,
        puzzle_id: impl Into<String>,
        size: SizeLabel,
        correct: bool,
        cost: f64,
        tokens: u64,
        duration_ms: f64,
    ) -> Self {
        Self {
            model: model.into(),
            puzzle_id: puzzle_id.into(),
            size,
            correct,
            cost: if cost.is_finite() { cost.max(0.0) } else { 0.0 },
            tokens,
            duration_ms: duration_ms.max(0.0),
            status: RunStatus::Success,
            error_message: None,
        }
    }

    /// A failed call: never correct, no cost, no tokens.
    pub fn failed(
        model: impl Into<String>,
        puzzle_id: impl Into<String>,
        size: SizeLabel,
        duration_ms: f64,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            puzzle_id: puzzle_id.into(),
            size,
            correct: false,
            cost: 0.0,
            tokens: 0,
            duration_ms: duration_ms.max(0.0),
            status: RunStatus::Failed,
            error_message: Some(error_message.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == RunStatus::Failed
    }

    /// Progress glyph: `✓` correct, `✗` failed, `○` wrong answer.
    pub fn glyph(&self) -> char {
        if self.correct {
            '✓'
        } else if self.is_failed() {
            '✗'
        } else {
            '○'
        }
    }
}

/// A persisted run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub id: Uuid,
    /// Identifier shared by every record written during one benchmark invocation.
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub result: RunResult,
}

impl RunRecord {
    pub fn new(session_id: impl Into<String>, timestamp: DateTime<Utc>, result: RunResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id: session_id.into(),
            timestamp,
            result,
        }
    }
}
