/// LLM Client: the single point of entry for hosted-model calls in Threadsmith.
///
/// ARCHITECTURAL RULE: No other module may call a model provider directly.
/// Every call goes through an `LlmProvider` built here, and exactly one provider
/// is active per process (chosen from `LLM_PROVIDER` at startup).
///
/// Calls are single-shot. There is no retry or backoff: a failed call is reported
/// to the caller, which decides what the user sees.
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::{LlmProviderKind, LlmSettings};

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;

/// HTTP timeout for a single model call.
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A request that forces the model to answer through one tool whose parameters
/// are a JSON schema. The tool arguments are the structured result.
#[derive(Debug, Clone, Copy)]
pub struct ToolCallRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub tool_name: &'a str,
    pub tool_description: &'a str,
    pub parameters: &'a Value,
    pub temperature: f64,
}

/// A hosted model binding. Implementations differ only in wire format.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier sent with every request.
    fn model(&self) -> &'static str;

    /// Issues one request and returns the raw JSON text of the forced tool's arguments.
    async fn call_tool(&self, request: &ToolCallRequest<'_>) -> Result<String, LlmError>;
}

/// Builds the provider selected by config.
pub fn build_provider(settings: &LlmSettings) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider: Arc<dyn LlmProvider> = match settings.provider {
        LlmProviderKind::OpenAi => Arc::new(OpenAiClient::new(settings.api_key.clone())?),
        LlmProviderKind::Anthropic => Arc::new(AnthropicClient::new(settings.api_key.clone())?),
    };
    Ok(provider)
}

pub(crate) fn http_client() -> Result<reqwest::Client, LlmError> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?)
}

/// Both providers wrap failures as `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Turns a non-2xx response body into an `LlmError::Api`, keeping the provider's
/// message when the body has the usual shape.
pub(crate) fn api_error(status: u16, body: String) -> LlmError {
    let message = serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api { status, message }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub(crate) fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
