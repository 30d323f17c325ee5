//! Model registry.
//!
//! An immutable list of the models under test, built once at start-up and
//! passed by reference into the orchestrator and the artifact builder. The
//! built-in roster can be replaced by a TOML file of `[[models]]` tables:
//!
//! ```toml
//! [[models]]
//! name = "gpt-5.2-high"
//! route = "openai/gpt-5.2"
//! reasoning = true
//! reasoning_config = { effort = "high", exclude = true }
//!
//! [[models]]
//! name = "gemini-3-pro-preview-high"
//! route = "google/gemini-3-pro-preview"
//! reasoning = true
//! reasoning_config = { effort = "high" }
//! provider = { only = ["google-vertex"], allow_fallbacks = false }
//! max_parallel = 4
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use scoring::artifact::ModelInfo;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Concurrency;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read model registry {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model registry {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("model #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("model '{0}' has an empty route")]
    EmptyRoute(String),

    #[error("model '{0}' is defined more than once")]
    DuplicateName(String),

    #[error("model '{0}' has max_parallel = 0")]
    ZeroParallel(String),

    #[error("unknown model(s): {0}")]
    UnknownModels(String),
}

/// Reasoning effort levels understood by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    Low,
    Medium,
    High,
    Xhigh,
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Xhigh => "xhigh",
        };
        f.write_str(s)
    }
}

/// The `reasoning` request block. Absent fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReasoningConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<ReasoningEffort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Keep the reasoning trace out of the response body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<bool>,
}

impl ReasoningConfig {
    fn effort(effort: ReasoningEffort) -> Self {
        Self {
            effort: Some(effort),
            enabled: None,
            exclude: Some(true),
        }
    }

    fn toggled(enabled: bool) -> Self {
        Self {
            effort: None,
            enabled: Some(enabled),
            exclude: Some(true),
        }
    }

    fn with_trace(mut self) -> Self {
        self.exclude = None;
        self
    }
}

/// The `provider` routing block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderRouting {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub only: Vec<String>,
    #[serde(default = "default_allow_fallbacks")]
    pub allow_fallbacks: bool,
}

fn default_allow_fallbacks() -> bool {
    true
}

impl ProviderRouting {
    fn pinned(provider: &str) -> Self {
        Self {
            only: vec![provider.to_string()],
            allow_fallbacks: false,
        }
    }
}

/// One benchmarked configuration. Two specs may share a route and differ only
/// in reasoning settings; `name` is what statistics are grouped by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSpec {
    pub name: String,
    /// Gateway model route, e.g. `openai/gpt-5.2`.
    pub route: String,
    #[serde(default)]
    pub reasoning: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_config: Option<ReasoningConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderRouting>,
    /// Overrides the global per-model parallel cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<usize>,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>, route: impl Into<String>, reasoning: bool) -> Self {
        Self {
            name: name.into(),
            route: route.into(),
            reasoning,
            reasoning_config: None,
            provider: None,
            max_parallel: None,
        }
    }

    pub fn with_reasoning(mut self, config: ReasoningConfig) -> Self {
        self.reasoning_config = Some(config);
        self
    }

    pub fn with_provider(mut self, provider: ProviderRouting) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_max_parallel(mut self, n: usize) -> Self {
        self.max_parallel = Some(n);
        self
    }

    /// In-flight call limit for this model within one size group.
    pub fn parallel_cap(&self, default_cap: usize, concurrency: Concurrency) -> usize {
        match concurrency {
            Concurrency::Sequential => 1,
            Concurrency::Parallel => self.max_parallel.unwrap_or(default_cap).max(1),
        }
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo::new(self.name.clone(), self.reasoning)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    models: Vec<ModelSpec>,
}

/// Which models a run should include.
#[derive(Debug, Clone, Default)]
pub struct ModelFilter {
    /// Exact names; empty means all.
    pub names: Vec<String>,
    pub reasoning_only: bool,
    pub non_reasoning_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelRegistry {
    models: Vec<ModelSpec>,
}

impl ModelRegistry {
    /// Validated registry from an explicit list.
    pub fn new(models: Vec<ModelSpec>) -> RegistryResult<Self> {
        let registry = Self { models };
        registry.validate()?;
        Ok(registry)
    }

    pub fn builtin() -> Self {
        Self {
            models: builtin_models(),
        }
    }

    pub fn from_toml_str(content: &str, origin: &str) -> RegistryResult<Self> {
        let file: RegistryFile = toml::from_str(content).map_err(|source| RegistryError::Parse {
            path: origin.to_string(),
            source,
        })?;
        Self::new(file.models)
    }

    pub fn load(path: &Path) -> RegistryResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    pub fn validate(&self) -> RegistryResult<()> {
        let mut seen = HashSet::new();
        for (index, model) in self.models.iter().enumerate() {
            if model.name.trim().is_empty() {
                return Err(RegistryError::EmptyName { index: index + 1 });
            }
            if model.route.trim().is_empty() {
                return Err(RegistryError::EmptyRoute(model.name.clone()));
            }
            if model.max_parallel == Some(0) {
                return Err(RegistryError::ZeroParallel(model.name.clone()));
            }
            if !seen.insert(model.name.as_str()) {
                return Err(RegistryError::DuplicateName(model.name.clone()));
            }
        }
        Ok(())
    }

    pub fn models(&self) -> &[ModelSpec] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.name.as_str())
    }

    /// Registry order is preserved. Unknown names in `filter.names` are an error.
    pub fn filter(&self, filter: &ModelFilter) -> RegistryResult<Self> {
        let unknown: Vec<&str> = filter
            .names
            .iter()
            .map(String::as_str)
            .filter(|name| self.get(name).is_none())
            .collect();
        if !unknown.is_empty() {
            return Err(RegistryError::UnknownModels(unknown.join(", ")));
        }

        let models = self
            .models
            .iter()
            .filter(|m| filter.names.is_empty() || filter.names.contains(&m.name))
            .filter(|m| !filter.reasoning_only || m.reasoning)
            .filter(|m| !filter.non_reasoning_only || !m.reasoning)
            .cloned()
            .collect();
        Ok(Self { models })
    }

    pub fn infos(&self) -> Vec<ModelInfo> {
        self.models.iter().map(ModelSpec::info).collect()
    }
}

fn builtin_models() -> Vec<ModelSpec> {
    use ReasoningEffort::*;

    let effort = ReasoningConfig::effort;
    let vertex = || ProviderRouting::pinned("google-vertex");

    vec![
        ModelSpec::new("olmo-3.1-32b-think", "allenai/olmo-3.1-32b-think", true),
        ModelSpec::new("claude-4.5-opus-low", "anthropic/claude-opus-4.5", true)
            .with_reasoning(effort(Low)),
        ModelSpec::new("claude-4.5-opus-high", "anthropic/claude-opus-4.5", true)
            .with_reasoning(effort(High)),
        ModelSpec::new(
            "claude-4.5-sonnet-non-reasoning",
            "anthropic/claude-sonnet-4.5",
            false,
        )
        .with_reasoning(ReasoningConfig::toggled(false)),
        ModelSpec::new("claude-4.5-sonnet-reasoning", "anthropic/claude-sonnet-4.5", true)
            .with_reasoning(ReasoningConfig::toggled(true)),
        ModelSpec::new("seed-1.6-high", "bytedance-seed/seed-1.6", true)
            .with_reasoning(effort(High)),
        ModelSpec::new("seed-1.6-flash-high", "bytedance-seed/seed-1.6-flash", true)
            .with_reasoning(effort(High)),
        ModelSpec::new("deepseek-v3.2", "deepseek/deepseek-v3.2", false),
        ModelSpec::new("deepseek-v3.2-high", "deepseek/deepseek-v3.2", true)
            .with_reasoning(effort(High)),
        ModelSpec::new("deepseek-v3.2-speciale", "deepseek/deepseek-v3.2-speciale", false),
        ModelSpec::new("deepseek-v3.2-speciale-high", "deepseek/deepseek-v3.2-speciale", true)
            .with_reasoning(effort(High)),
        ModelSpec::new(
            "gemini-3-flash-preview-minimal",
            "google/gemini-3-flash-preview",
            true,
        )
        .with_reasoning(effort(Minimal)),
        ModelSpec::new("gemini-3-flash-preview-high", "google/gemini-3-flash-preview", true)
            .with_reasoning(effort(High).with_trace())
            .with_provider(vertex()),
        ModelSpec::new("gemini-3-pro-preview-low", "google/gemini-3-pro-preview", true)
            .with_reasoning(effort(Low)),
        ModelSpec::new("gemini-3-pro-preview-high", "google/gemini-3-pro-preview", true)
            .with_reasoning(effort(High).with_trace())
            .with_provider(vertex()),
        ModelSpec::new("minimax-m2.1", "minimax/minimax-m2.1", true),
        ModelSpec::new("minimax-m2.1-high", "minimax/minimax-m2.1", true)
            .with_reasoning(effort(High)),
        ModelSpec::new("ministral-14b-2512", "mistralai/ministral-14b-2512", false),
        ModelSpec::new("mistral-large-2512", "mistralai/mistral-large-2512", false),
        ModelSpec::new("kimi-k2", "moonshotai/kimi-k2-0905", false),
        ModelSpec::new("kimi-k2-thinking", "moonshotai/kimi-k2-thinking", true),
        ModelSpec::new("kimi-k2.5-non-reasoning", "moonshotai/kimi-k2.5", false)
            .with_reasoning(ReasoningConfig::toggled(false)),
        ModelSpec::new("kimi-k2.5-high", "moonshotai/kimi-k2.5", true)
            .with_reasoning(effort(High)),
        ModelSpec::new("gpt-5.2-low", "openai/gpt-5.2", true).with_reasoning(effort(Low)),
        ModelSpec::new("gpt-5.2-high", "openai/gpt-5.2", true).with_reasoning(effort(High)),
        ModelSpec::new("gpt-5.2-xhigh", "openai/gpt-5.2", true).with_reasoning(effort(Xhigh)),
        ModelSpec::new("gpt-oss-120b-low", "openai/gpt-oss-120b", true)
            .with_reasoning(effort(Low)),
        ModelSpec::new("gpt-oss-120b-high", "openai/gpt-oss-120b", true)
            .with_reasoning(effort(High)),
        ModelSpec::new(
            "qwen3-next-80b-a3b-thinking",
            "qwen/qwen3-next-80b-a3b-thinking",
            true,
        ),
        ModelSpec::new("glm-4.7-non-reasoning", "z-ai/glm-4.7", false)
            .with_reasoning(ReasoningConfig::toggled(false)),
        ModelSpec::new("glm-4.7-reasoning", "z-ai/glm-4.7", true),
        ModelSpec::new("glm-4.7-reasoning-high", "z-ai/glm-4.7", true)
            .with_reasoning(effort(High)),
        ModelSpec::new("grok-4", "x-ai/grok-4", true),
        ModelSpec::new("grok-4.1-fast-non-reasoning", "x-ai/grok-4.1-fast", false)
            .with_reasoning(ReasoningConfig::toggled(false).with_trace()),
        ModelSpec::new("grok-4.1-fast-reasoning", "x-ai/grok-4.1-fast", true),
        ModelSpec::new("grok-4.1-fast-reasoning-high", "x-ai/grok-4.1-fast", true)
            .with_reasoning(effort(High)),
        ModelSpec::new("mimo-v2-flash", "xiaomi/mimo-v2-flash:free", false)
            .with_reasoning(ReasoningConfig::toggled(false).with_trace()),
        ModelSpec::new("mimo-v2-flash-high", "xiaomi/mimo-v2-flash:free", true)
            .with_reasoning(effort(High)),
    ]
}
