//! Usage extraction.
//!
//! Gateways report cost and token counts in differently shaped blocks. Each
//! shape is one [`ProviderUsage`] variant, picked from what the response
//! actually contains, and every variant reduces to the same
//! [`NormalizedUsage`] pair.

use serde::{Deserialize, Serialize};

/// The `{cost, tokens}` pair recorded on every successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedUsage {
    /// USD, never negative.
    pub cost: f64,
    /// Output tokens including reasoning where the provider splits them out.
    pub tokens: u64,
}

/// `usage` block of an OpenAI-compatible response, with the gateway's
/// accounting extensions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub cost_details: Option<WireCostDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WireCostDetails {
    #[serde(default)]
    pub upstream_inference_cost: Option<f64>,
}

/// Google-style `usageMetadata` block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireUsageMetadata {
    #[serde(default)]
    pub candidates_token_count: Option<u64>,
    #[serde(default)]
    pub thoughts_token_count: Option<u64>,
}

/// Gateway billing fields. The upstream provider's own charge wins over the
/// gateway's total when both are present.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GatewayCost {
    pub cost: Option<f64>,
    pub upstream_inference_cost: Option<f64>,
}

impl GatewayCost {
    fn from_wire(usage: &WireUsage) -> Self {
        Self {
            cost: usage.cost,
            upstream_inference_cost: usage
                .cost_details
                .as_ref()
                .and_then(|d| d.upstream_inference_cost),
        }
    }

    fn is_reported(&self) -> bool {
        self.cost.is_some() || self.upstream_inference_cost.is_some()
    }

    pub fn resolve(&self) -> f64 {
        let positive = |v: Option<f64>| v.filter(|c| c.is_finite() && *c > 0.0);
        positive(self.upstream_inference_cost)
            .or_else(|| positive(self.cost))
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderUsage {
    /// OpenAI-compatible usage with gateway cost fields.
    OpenRouter {
        completion_tokens: u64,
        cost: GatewayCost,
    },
    /// Google usage metadata, where thinking tokens are counted separately
    /// from candidate tokens.
    Google {
        completion_tokens: u64,
        candidates_tokens: Option<u64>,
        thoughts_tokens: Option<u64>,
        cost: GatewayCost,
    },
    /// Token count only; no cost information.
    Plain { completion_tokens: u64 },
}

impl ProviderUsage {
    /// Pick the variant matching the blocks present in a response.
    pub fn detect(usage: Option<&WireUsage>, metadata: Option<&WireUsageMetadata>) -> Self {
        let completion_tokens = usage.and_then(|u| u.completion_tokens).unwrap_or(0);
        let cost = usage.map(GatewayCost::from_wire).unwrap_or_default();

        match metadata {
            Some(meta) => Self::Google {
                completion_tokens,
                candidates_tokens: meta.candidates_token_count,
                thoughts_tokens: meta.thoughts_token_count,
                cost,
            },
            None if cost.is_reported() => Self::OpenRouter {
                completion_tokens,
                cost,
            },
            None => Self::Plain { completion_tokens },
        }
    }

    pub fn normalize(&self) -> NormalizedUsage {
        match self {
            Self::OpenRouter {
                completion_tokens,
                cost,
            } => NormalizedUsage {
                cost: cost.resolve(),
                tokens: *completion_tokens,
            },
            Self::Google {
                completion_tokens,
                candidates_tokens,
                thoughts_tokens,
                cost,
            } => {
                let tokens = match (candidates_tokens, thoughts_tokens) {
                    (Some(c), Some(t)) if *c > 0 && *t > 0 => c + t,
                    _ => *completion_tokens,
                };
                NormalizedUsage {
                    cost: cost.resolve(),
                    tokens,
                }
            }
            Self::Plain { completion_tokens } => NormalizedUsage {
                cost: 0.0,
                tokens: *completion_tokens,
            },
        }
    }
}
