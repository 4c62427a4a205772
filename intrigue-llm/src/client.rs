//! Gemini wire adapter: one request in, one classified outcome out.
//!
//! The adapter performs exactly one HTTP round trip per call. There is no
//! retry, no backoff and no caching; every failure is classified into a
//! typed [`AiError`] and surfaced exactly once to the orchestrator.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::AiConfig;
use crate::error::AiError;
use crate::types::{AiResponse, GeminiRequest, TokenUsage};

/// HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a client from configuration.
    #[must_use]
    pub fn new(config: &AiConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Model name requests are addressed to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Perform one round trip and classify the outcome.
    ///
    /// # Errors
    /// - HTTP 429 becomes [`AiError::RateLimitExceeded`]
    /// - any other non-success status becomes [`AiError::RequestFailed`]
    ///   carrying the status
    /// - a transport failure (including timeout) becomes
    ///   [`AiError::RequestFailed`] with no status
    /// - a 200 with a malformed body becomes
    ///   [`AiError::ResponseParsingFailed`] naming the missing level
    /// - `finishReason == "SAFETY"` becomes [`AiError::ResponseBlockedBySafety`]
    pub async fn generate(&self, request: &GeminiRequest) -> Result<AiResponse, AiError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = build_wire_body(request);

        debug!(model = %self.model, "sending generateContent request");

        let start = Instant::now();
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        let raw = resp.text().await?;
        let duration_ms = start.elapsed().as_millis() as u64;

        if status.as_u16() == 429 {
            warn!("provider rate limit hit");
            return Err(AiError::RateLimitExceeded);
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), "provider returned error status");
            return Err(AiError::RequestFailed {
                status: Some(status.as_u16()),
                detail: raw,
            });
        }

        extract_response(&raw, duration_ms)
    }
}

/// Build the provider wire body from a request.
///
/// `responseMimeType` and `responseSchema` are omitted entirely when unset;
/// the provider rejects explicit nulls in `generationConfig`.
#[must_use]
pub fn build_wire_body(request: &GeminiRequest) -> Value {
    let contents: Vec<Value> = request
        .messages
        .iter()
        .map(|m| {
            json!({
                "role": m.role.wire_name(),
                "parts": [{ "text": m.text }],
            })
        })
        .collect();

    let mut generation_config = json!({
        "temperature": request.generation_config.temperature,
    });
    if let Some(mime) = &request.generation_config.response_mime_type {
        generation_config["responseMimeType"] = json!(mime);
    }
    if let Some(schema) = &request.generation_config.response_schema {
        generation_config["responseSchema"] = schema.clone();
    }

    json!({
        "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
        "contents": contents,
        "generationConfig": generation_config,
    })
}

/// Classify a 200 response body into a usable [`AiResponse`] or a typed
/// error naming the first missing level.
fn extract_response(raw: &str, duration_ms: u64) -> Result<AiResponse, AiError> {
    let parsing = |detail: &str| AiError::parsing(detail, raw);

    let body: Value = serde_json::from_str(raw)
        .map_err(|e| parsing(&format!("response body is not valid JSON: {e}")))?;

    let candidates = body
        .get("candidates")
        .and_then(Value::as_array)
        .ok_or_else(|| parsing("missing 'candidates' array"))?;
    let candidate = candidates
        .first()
        .ok_or_else(|| parsing("'candidates' array is empty"))?;

    let finish_reason = candidate
        .get("finishReason")
        .and_then(Value::as_str)
        .ok_or_else(|| parsing("candidate is missing 'finishReason'"))?;
    if finish_reason == "SAFETY" {
        warn!("generation blocked by safety filter");
        return Err(AiError::ResponseBlockedBySafety);
    }

    let content = candidate
        .get("content")
        .filter(|v| v.is_object())
        .ok_or_else(|| parsing("candidate is missing 'content'"))?;
    let parts = content
        .get("parts")
        .and_then(Value::as_array)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| parsing("content is missing 'parts'"))?;
    let text = parts[0]
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| parsing("first part is missing 'text'"))?;

    let usage = body
        .get("usageMetadata")
        .filter(|v| v.is_object())
        .ok_or_else(|| parsing("missing 'usageMetadata'"))?;
    let count = |key: &str| usage.get(key).and_then(Value::as_u64).unwrap_or(0) as u32;
    let token_usage = TokenUsage {
        prompt_tokens: count("promptTokenCount"),
        completion_tokens: count("candidatesTokenCount"),
        total_tokens: count("totalTokenCount"),
    };

    let model_version = body
        .get("modelVersion")
        .and_then(Value::as_str)
        .map(String::from);

    Ok(AiResponse {
        content: text.to_string(),
        token_usage,
        duration_ms,
        model_version,
        raw_json: raw.to_string(),
        finish_reason: finish_reason.to_string(),
    })
}
