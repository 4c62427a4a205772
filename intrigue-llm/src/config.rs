//! Configuration for the model-facing layer.
//!
//! Maps directly to the `[ai]` section of `intrigue.toml`.

use serde::{Deserialize, Serialize};

use crate::error::{AiError, Result};

/// Settings for the Gemini wire adapter and orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API key, passed in the request query string.
    pub api_key: String,
    /// Provider base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model name used to build the request path.
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_timeout_ms() -> u64 {
    60_000
}

impl AiConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns [`AiError::Config`] if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| AiError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns [`AiError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AiError::Config(e.to_string()))?;
        Self::from_toml(&content)
    }
}
