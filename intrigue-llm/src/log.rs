//! Audit log for external-model attempts.
//!
//! One [`AiLog`] is created per orchestration attempt, in `Pending` state,
//! before the network call. It is transitioned exactly once to `Success`
//! or `Error` after the single outcome and is immutable thereafter. A log
//! in `Success` state does not imply the response was usable; parsing
//! happens after the transition, so "the model responded" and "the
//! response was usable" stay distinguishable in the audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{AiResponse, TokenUsage};

/// Unique identifier for an audit log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AiLogId(pub Uuid);

impl AiLogId {
    /// Create a new random log ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AiLogId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AiLogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of the attempt as recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiLogStatus {
    /// Created, network call not yet resolved.
    Pending,
    /// The provider returned a classified success.
    Success,
    /// The attempt failed at the wire level.
    Error,
}

/// Durable record of one external-model round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiLog {
    /// Identity.
    pub id: AiLogId,
    /// When the attempt started.
    pub created_at: DateTime<Utc>,
    /// Model name the request was addressed to.
    pub model: String,
    /// Concrete model version the provider served, once known.
    pub model_version: Option<String>,
    /// Operation action name (e.g. `simulate_tick`).
    pub action: String,
    /// Rendered system prompt.
    pub system_prompt: String,
    /// Rendered user prompt (first user turn).
    pub user_prompt: String,
    /// Serialized request body, for replay and audit.
    pub request_body: String,
    /// Attempt outcome.
    pub status: AiLogStatus,
    /// Tokens in the prompt.
    pub prompt_tokens: Option<u32>,
    /// Tokens generated.
    pub completion_tokens: Option<u32>,
    /// Total billed tokens.
    pub total_tokens: Option<u32>,
    /// Round-trip wall time.
    pub duration_ms: Option<u64>,
    /// Why generation stopped.
    pub finish_reason: Option<String>,
    /// Full raw response body.
    pub raw_response: Option<String>,
    /// The extracted return text handed to `parse`.
    pub parsed_content: Option<String>,
    /// Error message on wire failure.
    pub error_message: Option<String>,
}

impl AiLog {
    /// Create a log in `Pending` state, before the network call.
    #[must_use]
    pub fn pending(
        model: impl Into<String>,
        action: impl Into<String>,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        request_body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AiLogId::new(),
            created_at: now,
            model: model.into(),
            model_version: None,
            action: action.into(),
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            request_body: request_body.into(),
            status: AiLogStatus::Pending,
            prompt_tokens: None,
            completion_tokens: None,
            total_tokens: None,
            duration_ms: None,
            finish_reason: None,
            raw_response: None,
            parsed_content: None,
            error_message: None,
        }
    }

    /// Record a classified wire success. The log becomes `Success` even if
    /// operation-level parsing later rejects the content.
    pub fn mark_success(&mut self, response: &AiResponse) {
        self.status = AiLogStatus::Success;
        self.record_usage(response.token_usage);
        self.duration_ms = Some(response.duration_ms);
        self.model_version = response.model_version.clone();
        self.finish_reason = Some(response.finish_reason.clone());
        self.raw_response = Some(response.raw_json.clone());
        self.parsed_content = Some(response.content.clone());
    }

    /// Record a wire-level failure.
    pub fn mark_error(&mut self, message: impl Into<String>, duration_ms: u64) {
        self.status = AiLogStatus::Error;
        self.error_message = Some(message.into());
        self.duration_ms = Some(duration_ms);
    }

    fn record_usage(&mut self, usage: TokenUsage) {
        self.prompt_tokens = Some(usage.prompt_tokens);
        self.completion_tokens = Some(usage.completion_tokens);
        self.total_tokens = Some(usage.total_tokens);
    }
}
