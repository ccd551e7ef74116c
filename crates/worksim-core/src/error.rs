//! Engine error types.
//!
//! Task-level and timer-level failures are recovered locally by the caller;
//! only a failed sink hand-off is meant to reach the candidate.

use thiserror::Error;

/// Errors produced by the attempt state machine and the engine driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The submitted answer had no content and no attached files.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A task action arrived after the attempt had already finished.
    #[error("attempt already finished, late {action} ignored")]
    ExpiryRace { action: &'static str },

    /// The submission sink rejected or failed to receive the results.
    #[error("submission sink failed: {0}")]
    SinkFailure(String),

    /// Results were requested while tasks are still running.
    #[error("attempt is still active")]
    NotFinished,

    /// The results of this attempt were already accepted by the sink.
    #[error("attempt results already submitted")]
    AlreadySubmitted,
}

impl EngineError {
    /// Returns `true` if this error should be shown to the candidate.
    ///
    /// Everything else is handled by re-prompting or by dropping the late call.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, EngineError::SinkFailure(_))
    }

    /// Returns `true` if the same finalization can be retried with the same data.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::SinkFailure(_))
    }
}
