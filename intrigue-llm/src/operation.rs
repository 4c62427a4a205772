//! The contract every model use case implements.

use serde_json::Value;

use crate::error::Result;
use crate::prompt::PromptId;
use crate::types::ChatMessage;

/// One kind of model request: prompt identity, message turns, response
/// schema, optional temperature override, and a validating parser on the
/// way back.
///
/// Implementations live with the domain that owns the output type. `parse`
/// must be pure and must return [`crate::AiError::ResponseParsingFailed`]
/// on any structural violation of its own contract: the requested
/// response schema is defense-in-depth, never a substitute for
/// re-validation.
pub trait AiOperation {
    /// The validated value this operation produces.
    type Output;

    /// Name recorded in the audit log (e.g. `simulate_tick`).
    fn action_name(&self) -> &'static str;

    /// Which prompt template renders the system prompt.
    fn prompt_id(&self) -> PromptId;

    /// Substitution variables for the system prompt template.
    fn prompt_vars(&self) -> Vec<(String, String)>;

    /// Ordered message turns for this request.
    fn messages(&self) -> Vec<ChatMessage>;

    /// Structured response schema requested from the provider, if any.
    fn response_schema(&self) -> Option<Value> {
        None
    }

    /// Temperature override; `None` means the configured default applies.
    fn temperature(&self) -> Option<f32> {
        None
    }

    /// Validate and convert the returned content.
    fn parse(&self, content: &str) -> Result<Self::Output>;
}
