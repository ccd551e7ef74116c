//! Sink error types.

use thiserror::Error;

/// Errors that can occur when handing results to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The backend rejected our credentials (HTTP 401/403).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The backend returned an error response.
    #[error("submission rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// Writing results locally failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl SinkError {
    /// Returns `true` if resubmitting the same payload cannot succeed as-is.
    pub fn is_permanent(&self) -> bool {
        match self {
            SinkError::Unauthorized(_) => true,
            SinkError::Rejected { status, .. } => (400..500).contains(status) && *status != 429,
            SinkError::Timeout(_) | SinkError::Network(_) | SinkError::Storage(_) => false,
        }
    }
}
