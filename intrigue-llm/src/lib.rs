//! # intrigue-llm: Model-Facing Layer for Intrigue
//!
//! Everything that talks to the external model lives here:
//!   - **GeminiClient**: one HTTP round trip per call, classified into a
//!     typed success or a typed error
//!   - **PromptEngine**: versioned templates rendered with `{key}`
//!     substitutions
//!   - **AiOperation**: the contract each use case implements (prompt,
//!     message turns, response schema, validating parser)
//!   - **AiOrchestrator**: composes the above into one audited attempt
//!   - **AiLog**: durable audit record, one per attempt, success or not
//!
//! Model output is schema-constrained but still untrusted: the schema is
//! requested as defense-in-depth, and every operation re-validates the
//! content it receives. There is no retry, no backoff and no caching;
//! every failure surfaces exactly once as a tagged [`AiCallResult`]
//! carrying its audit log.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod log;
pub mod operation;
pub mod orchestrator;
pub mod prompt;
pub mod result;
pub mod types;

pub use client::GeminiClient;
pub use config::AiConfig;
pub use error::AiError;
pub use log::{AiLog, AiLogId, AiLogStatus};
pub use operation::AiOperation;
pub use orchestrator::AiOrchestrator;
pub use prompt::{PromptEngine, PromptId};
pub use result::AiCallResult;
pub use types::{AiResponse, ChatMessage, GeminiRequest, GenerationConfig, MessageRole, TokenUsage};
