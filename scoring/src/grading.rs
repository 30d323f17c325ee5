//! Grading of model answers.
//!
//! A run is correct only when the returned grid matches the known solution
//! exactly once all whitespace is removed from both sides. There is no
//! partial credit.
//!
//! Parsing the model's structured output is a separate step: a response that
//! does not contain a `{"solution": "..."}` object at all is a [`ParseError`],
//! which callers record as a failed invocation rather than a wrong answer.

use std::sync::OnceLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The structured answer a model is asked to return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SolutionPayload {
    /// Row-major grid of "1" (filled) and "0" (empty) cells.
    pub solution: String,
}

impl SolutionPayload {
    /// JSON schema for the payload, suitable for a `json_schema` response format.
    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(SolutionPayload);
        serde_json::to_value(schema).unwrap_or_else(|_| {
            serde_json::json!({
                "type": "object",
                "properties": { "solution": { "type": "string" } },
                "required": ["solution"],
                "additionalProperties": false
            })
        })
    }
}

/// Why a model response could not be turned into a [`SolutionPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response was empty")]
    Empty,

    #[error("no JSON object found in response")]
    NoJsonObject,

    #[error("response JSON does not match schema: {0}")]
    Schema(String),
}

/// Remove every whitespace character.
pub fn normalize(grid: &str) -> String {
    grid.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Exact match after whitespace normalisation.
pub fn grade(candidate: &str, solution: &str) -> bool {
    normalize(candidate) == normalize(solution)
}

/// Number of cells that differ between two normalised grids.
///
/// Extra or missing trailing cells each count as one difference. Used only
/// for diagnostics; grading stays binary.
pub fn cell_differences(candidate: &str, solution: &str) -> usize {
    let a: Vec<char> = normalize(candidate).chars().collect();
    let b: Vec<char> = normalize(solution).chars().collect();
    let mismatched = a.iter().zip(b.iter()).filter(|(x, y)| x != y).count();
    mismatched + a.len().abs_diff(b.len())
}

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("static regex is valid")
    })
}

/// Extract the solution payload from raw model text.
///
/// Accepts a bare JSON object, a fenced ```json block, or an object embedded
/// in surrounding prose (first `{` to last `}`).
pub fn parse_solution(raw: &str) -> Result<SolutionPayload, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let candidate = if let Some(caps) = fenced_block().captures(trimmed) {
        caps.get(1).map(|m| m.as_str()).unwrap_or(trimmed)
    } else {
        match (trimmed.find('{'), trimmed.rfind('}')) {
            (Some(start), Some(end)) if start < end => &trimmed[start..=end],
            _ => return Err(ParseError::NoJsonObject),
        }
    };

    let value: serde_json::Value =
        serde_json::from_str(candidate).map_err(|e| ParseError::Schema(e.to_string()))?;
    let solution = value
        .get("solution")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ParseError::Schema("missing string field 'solution'".to_string()))?;

    Ok(SolutionPayload {
        solution: solution.to_string(),
    })
}
