//! Composes prompt engine, wire adapter and an operation into one audited
//! attempt.
//!
//! [`AiOrchestrator::execute`] never returns a bare error: every path
//! (template miss, wire failure, unusable response) yields exactly one
//! [`AiLog`] and one tagged [`AiCallResult`]. The log transitions to
//! `Success` before parsing runs, so a parse failure leaves a
//! Success-status log behind: the model responded, the response just
//! wasn't usable.

use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::client::{GeminiClient, build_wire_body};
use crate::log::AiLog;
use crate::operation::AiOperation;
use crate::prompt::PromptEngine;
use crate::result::AiCallResult;
use crate::types::{GeminiRequest, GenerationConfig, MessageRole};

/// Executes operations against the model, producing audited results.
pub struct AiOrchestrator {
    client: GeminiClient,
    prompts: PromptEngine,
}

impl AiOrchestrator {
    /// Create an orchestrator over a wire adapter and a prompt engine.
    #[must_use]
    pub fn new(client: GeminiClient, prompts: PromptEngine) -> Self {
        Self { client, prompts }
    }

    /// Run one full attempt: render, request, classify, audit, parse.
    ///
    /// `now` is the caller-supplied wall-clock timestamp recorded on the
    /// log; the round-trip duration is measured on a monotonic clock.
    pub async fn execute<O: AiOperation>(
        &self,
        operation: &O,
        now: DateTime<Utc>,
    ) -> AiCallResult<O::Output> {
        let action = operation.action_name();
        debug!(action, "executing model operation");

        // Resolve the template; a miss is an attempt-level failure and
        // still produces an audit record.
        let template = match self.prompts.get(operation.prompt_id()) {
            Some(t) => t,
            None => {
                let error =
                    crate::AiError::PromptTemplateNotFound(operation.prompt_id().to_string());
                let mut log =
                    AiLog::pending(self.client.model(), action, "", "", "", now);
                log.mark_error(error.to_string(), 0);
                warn!(action, %error, "prompt template missing");
                return AiCallResult::Failure { log, error };
            }
        };

        let vars = operation.prompt_vars();
        let borrowed: Vec<(&str, &str)> =
            vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let system_prompt = crate::prompt::render_template(&template.system, &borrowed);

        let messages = operation.messages();
        let user_prompt = messages
            .iter()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.text.clone())
            .unwrap_or_default();

        let response_schema = operation.response_schema();
        let request = GeminiRequest {
            system_instruction: system_prompt.clone(),
            messages,
            generation_config: GenerationConfig {
                // Operation override beats the template's configured default.
                temperature: operation.temperature().unwrap_or(template.temperature),
                response_mime_type: response_schema
                    .is_some()
                    .then(|| "application/json".to_string()),
                response_schema,
            },
        };
        let request_body =
            serde_json::to_string(&build_wire_body(&request)).unwrap_or_default();

        let mut log = AiLog::pending(
            self.client.model(),
            action,
            system_prompt,
            user_prompt,
            request_body,
            now,
        );

        let start = Instant::now();
        let response = match self.client.generate(&request).await {
            Ok(r) => r,
            Err(error) => {
                log.mark_error(error.to_string(), start.elapsed().as_millis() as u64);
                warn!(action, %error, "model attempt failed at the wire");
                return AiCallResult::Failure { log, error };
            }
        };

        // The wire succeeded; record it before parsing so the audit trail
        // distinguishes "the model responded" from "the response was usable".
        log.mark_success(&response);

        match operation.parse(&response.content) {
            Ok(value) => {
                debug!(
                    action,
                    duration_ms = response.duration_ms,
                    total_tokens = response.token_usage.total_tokens,
                    "model attempt succeeded"
                );
                AiCallResult::Success { value, log }
            }
            Err(error) => {
                warn!(action, %error, "model responded but content was unusable");
                AiCallResult::Failure { log, error }
            }
        }
    }
}
