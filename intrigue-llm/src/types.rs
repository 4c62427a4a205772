//! Request and response types for the model wire protocol.

use serde::{Deserialize, Serialize};

/// Who authored a message turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The game (caller) side of the conversation.
    User,
    /// A prior model turn replayed as context.
    Model,
}

impl MessageRole {
    /// Wire name used in the `contents[].role` field.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One ordered message turn in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Turn author.
    pub role: MessageRole,
    /// Turn text.
    pub text: String,
}

impl ChatMessage {
    /// Create a user turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }

    /// Create a model turn.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Model,
            text: text.into(),
        }
    }
}

/// Generation parameters passed through to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f32,
    /// MIME type requested for the response (e.g. `application/json`).
    pub response_mime_type: Option<String>,
    /// Structured response schema, provider format. Defense-in-depth only;
    /// operations still re-validate everything the model returns.
    pub response_schema: Option<serde_json::Value>,
}

/// A fully assembled request, one per orchestration attempt.
#[derive(Debug, Clone, Serialize)]
pub struct GeminiRequest {
    /// Rendered system prompt.
    pub system_instruction: String,
    /// Ordered message turns.
    pub messages: Vec<ChatMessage>,
    /// Generation parameters.
    pub generation_config: GenerationConfig,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the generated candidates.
    pub completion_tokens: u32,
    /// Total billed tokens.
    pub total_tokens: u32,
}

/// A classified successful response from the provider.
#[derive(Debug, Clone)]
pub struct AiResponse {
    /// The generated text (first candidate, first part).
    pub content: String,
    /// Token accounting.
    pub token_usage: TokenUsage,
    /// Wall time of the round trip, monotonic clock.
    pub duration_ms: u64,
    /// Concrete model version the provider served.
    pub model_version: Option<String>,
    /// The full response body, for the audit log.
    pub raw_json: String,
    /// Why generation stopped (e.g. `STOP`, `MAX_TOKENS`).
    pub finish_reason: String,
}
