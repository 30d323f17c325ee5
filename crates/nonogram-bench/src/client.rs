//! Completion client.
//!
//! [`CompletionClient`] is the only seam between the orchestrator and the
//! network. [`OpenRouterClient`] speaks the OpenAI-compatible chat
//! completions protocol with a `json_schema` response format; tests swap in
//! scripted fakes.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use scoring::grading::{parse_solution, ParseError, SolutionPayload};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::registry::{ModelSpec, ProviderRouting, ReasoningConfig};
use crate::usage::{NormalizedUsage, ProviderUsage, WireUsage, WireUsageMetadata};

/// Classification of a failed call, for logging and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCategory {
    /// Network failure or timeout; likely to succeed on a later run.
    Transient,
    /// Upstream throttling.
    RateLimit,
    /// The model answered but not in the requested shape.
    ParseFailure,
    /// The provider rejected the request itself.
    Provider,
    /// Local misconfiguration; retrying will not help.
    Configuration,
}

impl RetryCategory {
    pub fn is_retriable(self) -> bool {
        matches!(self, Self::Transient | Self::RateLimit | Self::ParseFailure)
    }
}

impl fmt::Display for RetryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::RateLimit => write!(f, "rate_limit"),
            Self::ParseFailure => write!(f, "parse_failure"),
            Self::Provider => write!(f, "provider"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Everything that can go wrong in one completion call. The `Display` text is
/// stored verbatim as the run's error message.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("API error ({status}): {body}")]
    Http { status: u16, body: String },

    /// Error payload returned inside an otherwise successful response.
    #[error("{message}")]
    Provider { code: Option<i64>, message: String },

    #[error("no choices in response")]
    EmptyResponse,

    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    #[error("invalid solution payload: {0}")]
    Parse(#[from] ParseError),

    #[error("client configuration error: {0}")]
    Configuration(String),
}

impl CompletionError {
    pub fn retry_category(&self) -> RetryCategory {
        match self {
            Self::Transport(_) | Self::Timeout(_) | Self::EmptyResponse => RetryCategory::Transient,
            Self::Http { status: 429, .. } | Self::Provider { code: Some(429), .. } => {
                RetryCategory::RateLimit
            }
            Self::Http { status, .. } if *status >= 500 => RetryCategory::Transient,
            Self::Http { .. } | Self::Provider { .. } => RetryCategory::Provider,
            Self::MalformedResponse(_) | Self::Parse(_) => RetryCategory::ParseFailure,
            Self::Configuration(_) => RetryCategory::Configuration,
        }
    }
}

/// One puzzle sent to one model.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: ModelSpec,
    pub system: String,
    pub prompt: String,
    pub max_output_tokens: u32,
}

/// A parsed answer and what it cost.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub solution: String,
    pub usage: NormalizedUsage,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest)
        -> Result<CompletionResponse, CompletionError>;
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct UsageOptions {
    include: bool,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    response_format: ResponseFormat,
    usage: UsageOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<&'a ReasoningConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<&'a ProviderRouting>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
    /// Gemini's native usage block. OpenRouter chat completions never carry
    /// it; it appears when the base URL points at a proxy that forwards
    /// Gemini responses with their `usageMetadata` alongside `usage`.
    #[serde(default, rename = "usageMetadata")]
    usage_metadata: Option<WireUsageMetadata>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<serde_json::Value>,
    message: String,
}

/// Schema for the `response_format` block, minus the `$schema` and `title` keys.
fn solution_schema() -> serde_json::Value {
    let mut schema = SolutionPayload::json_schema();
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    schema
}

/// Client for an OpenAI-compatible gateway.
#[derive(Clone)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout_secs: u64,
}

impl OpenRouterClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CompletionError::Configuration(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_body<'a>(request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &request.model.route,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_output_tokens,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: "solution",
                    strict: true,
                    schema: solution_schema(),
                },
            },
            usage: UsageOptions { include: true },
            reasoning: request.model.reasoning_config.as_ref(),
            provider: request.model.provider.as_ref(),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> CompletionError {
        if e.is_timeout() {
            CompletionError::Timeout(self.timeout_secs)
        } else {
            CompletionError::Transport(e.to_string())
        }
    }
}

/// Turn a decoded response body into an answer.
fn interpret(chat: ChatResponse) -> Result<CompletionResponse, CompletionError> {
    if let Some(err) = chat.error {
        return Err(CompletionError::Provider {
            code: err.code.as_ref().and_then(|c| {
                c.as_i64()
                    .or_else(|| c.as_str().and_then(|s| s.parse().ok()))
            }),
            message: err.message,
        });
    }

    let content = chat
        .choices
        .into_iter()
        .next()
        .ok_or(CompletionError::EmptyResponse)?
        .message
        .content
        .unwrap_or_default();

    let payload = parse_solution(&content)?;
    let usage = ProviderUsage::detect(chat.usage.as_ref(), chat.usage_metadata.as_ref());

    Ok(CompletionResponse {
        solution: payload.solution,
        usage: usage.normalize(),
    })
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let body = Self::build_body(request);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(CompletionError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(model = %request.model.name, bytes = text.len(), "completion response received");

        let chat: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;
        interpret(chat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ReasoningEffort;

    fn request(model: ModelSpec) -> CompletionRequest {
        CompletionRequest {
            model,
            system: "rules".into(),
            prompt: "Row clues: ...".into(),
            max_output_tokens: 32_000,
        }
    }

    fn decode(json: serde_json::Value) -> Result<CompletionResponse, CompletionError> {
        interpret(serde_json::from_value(json).unwrap())
    }

    #[test]
    fn request_body_carries_schema_usage_and_routing() {
        let model = ModelSpec::new("gemini-high", "google/gemini-3-pro-preview", true)
            .with_reasoning(ReasoningConfig {
                effort: Some(ReasoningEffort::High),
                enabled: None,
                exclude: None,
            })
            .with_provider(ProviderRouting {
                only: vec!["google-vertex".into()],
                allow_fallbacks: false,
            });
        let req = request(model);
        let body = serde_json::to_value(OpenRouterClient::build_body(&req)).unwrap();

        assert_eq!(body["model"], "google/gemini-3-pro-preview");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Row clues: ...");
        assert_eq!(body["max_tokens"], 32_000);
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(
            body["response_format"]["json_schema"]["schema"]["properties"]["solution"]["type"],
            "string"
        );
        assert!(body["response_format"]["json_schema"]["schema"]
            .get("$schema")
            .is_none());
        assert_eq!(body["usage"]["include"], true);
        assert_eq!(body["reasoning"]["effort"], "high");
        assert!(body["reasoning"].get("exclude").is_none());
        assert_eq!(body["provider"]["only"][0], "google-vertex");
        assert_eq!(body["provider"]["allow_fallbacks"], false);
    }

    #[test]
    fn plain_model_omits_optional_blocks() {
        let req = request(ModelSpec::new("kimi-k2", "moonshotai/kimi-k2-0905", false));
        let body = serde_json::to_value(OpenRouterClient::build_body(&req)).unwrap();
        assert!(body.get("reasoning").is_none());
        assert!(body.get("provider").is_none());
    }

    #[test]
    fn endpoint_joins_base_url() {
        let client = OpenRouterClient::new("http://localhost:9/v1/", "k", 5).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9/v1/chat/completions");
    }

    #[test]
    fn decodes_solution_and_cost() {
        let response = decode(serde_json::json!({
            "choices": [{ "message": { "content": "{\"solution\": \"1001\"}" } }],
            "usage": {
                "completion_tokens": 42,
                "cost": 0.3,
                "cost_details": { "upstream_inference_cost": 0.25 }
            }
        }))
        .unwrap();
        assert_eq!(response.solution, "1001");
        assert_eq!(response.usage.tokens, 42);
        assert_eq!(response.usage.cost, 0.25);
    }

    #[test]
    fn openrouter_body_never_takes_the_gemini_path() {
        // OpenRouter folds reasoning into completion_tokens and reports the
        // split under completion_tokens_details.
        let response = decode(serde_json::json!({
            "choices": [{ "message": { "content": "{\"solution\": \"1001\"}" } }],
            "usage": {
                "completion_tokens": 900,
                "completion_tokens_details": { "reasoning_tokens": 700 },
                "cost": 0.01
            }
        }))
        .unwrap();
        assert_eq!(response.usage.tokens, 900);
        assert_eq!(response.usage.cost, 0.01);
    }

    #[test]
    fn forwarded_gemini_usage_metadata_counts_thoughts() {
        let response = decode(serde_json::json!({
            "choices": [{ "message": { "content": "{\"solution\": \"1001\"}" } }],
            "usage": { "completion_tokens": 120 },
            "usageMetadata": { "candidatesTokenCount": 120, "thoughtsTokenCount": 480 }
        }))
        .unwrap();
        assert_eq!(response.usage.tokens, 600);
        assert_eq!(response.usage.cost, 0.0);
    }

    #[test]
    fn provider_error_payload_is_verbatim() {
        let err = decode(serde_json::json!({
            "error": { "code": 429, "message": "rate limited" }
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "rate limited");
        assert_eq!(err.retry_category(), RetryCategory::RateLimit);
    }

    #[test]
    fn empty_and_unparsable_responses_fail() {
        let empty = decode(serde_json::json!({ "choices": [] })).unwrap_err();
        assert!(matches!(empty, CompletionError::EmptyResponse));

        let prose = decode(serde_json::json!({
            "choices": [{ "message": { "content": "I could not solve it." } }]
        }))
        .unwrap_err();
        assert!(matches!(prose, CompletionError::Parse(ParseError::NoJsonObject)));
        assert_eq!(prose.retry_category(), RetryCategory::ParseFailure);

        let null_content = decode(serde_json::json!({
            "choices": [{ "message": { "content": null } }]
        }))
        .unwrap_err();
        assert!(matches!(null_content, CompletionError::Parse(ParseError::Empty)));
    }

    #[test]
    fn http_status_classification() {
        let throttled = CompletionError::Http {
            status: 429,
            body: String::new(),
        };
        assert_eq!(throttled.retry_category(), RetryCategory::RateLimit);
        let upstream = CompletionError::Http {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(upstream.retry_category(), RetryCategory::Transient);
        assert_eq!(upstream.to_string(), "API error (502): bad gateway");
        let auth = CompletionError::Http {
            status: 401,
            body: String::new(),
        };
        assert!(!auth.retry_category().is_retriable());
    }
}
