//! Tagged outcome of one orchestration attempt.

use crate::error::AiError;
use crate::log::AiLog;

/// Ephemeral result of one attempt. Always carries the audit log so
/// callers can correlate "was this logged" with "did it succeed". Never
/// persisted, only the log is.
#[derive(Debug)]
pub enum AiCallResult<T> {
    /// The model responded and the response was usable.
    Success {
        /// The operation's validated output.
        value: T,
        /// Audit record of the attempt.
        log: AiLog,
    },
    /// The attempt failed, at the wire or during parsing.
    Failure {
        /// Audit record of the attempt. Status is `Error` for wire
        /// failures but stays `Success` when only parsing failed.
        log: AiLog,
        /// What went wrong.
        error: AiError,
    },
}

impl<T> AiCallResult<T> {
    /// Whether the attempt produced a usable value.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The audit log, regardless of outcome.
    #[must_use]
    pub fn log(&self) -> &AiLog {
        match self {
            Self::Success { log, .. } | Self::Failure { log, .. } => log,
        }
    }

    /// Consume the result, yielding the value or the error. The log is
    /// dropped; callers wanting it should destructure instead.
    pub fn into_value(self) -> Result<T, AiError> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::Failure { error, .. } => Err(error),
        }
    }
}
