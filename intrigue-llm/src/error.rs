//! Error taxonomy for model attempts.
//!
//! Everything here describes a single failed attempt; the orchestrator
//! converts these into tagged [`crate::AiCallResult::Failure`] values so
//! callers always receive the audit log alongside the error. Domain
//! precondition violations live in `intrigue-sim` and are never wrapped
//! in this type.

use thiserror::Error;

/// Errors that can occur during one external-model attempt.
#[derive(Debug, Error)]
pub enum AiError {
    /// Provider returned HTTP 429.
    #[error("AI provider rate limit exceeded")]
    RateLimitExceeded,

    /// The HTTP round trip failed: either the provider answered with a
    /// non-success status, or the transport itself broke (no status).
    #[error("AI request failed (status: {status:?}): {detail}")]
    RequestFailed {
        /// HTTP status code, if the provider answered at all.
        status: Option<u16>,
        /// Response body or transport error message.
        detail: String,
    },

    /// Generation stopped with `finishReason == "SAFETY"`.
    #[error("AI response blocked by safety filter")]
    ResponseBlockedBySafety,

    /// The response could not be used: wire shape violation or an
    /// operation-level schema violation. Used by both layers.
    #[error("Failed to parse AI response: {detail}")]
    ResponseParsingFailed {
        /// What was wrong.
        detail: String,
        /// The raw content that failed to parse.
        raw: String,
    },

    /// No prompt template loaded under the requested id.
    #[error("Prompt template not found: {0}")]
    PromptTemplateNotFound(String),

    /// Configuration error (bad TOML, unreadable file).
    #[error("AI configuration error: {0}")]
    Config(String),
}

impl AiError {
    /// Shorthand for an operation-level schema violation.
    #[must_use]
    pub fn parsing(detail: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::ResponseParsingFailed {
            detail: detail.into(),
            raw: raw.into(),
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::RequestFailed {
            status: err.status().map(|s| s.as_u16()),
            detail: err.to_string(),
        }
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, AiError>;
