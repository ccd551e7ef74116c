//! Trait for the external submission sink.
//!
//! Implemented by the `worksim-sink` crate (HTTP, file, mock).

use async_trait::async_trait;

use crate::aggregate::{SimulationPayload, SubmissionReceipt};

/// Destination for finished attempts.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Human-readable sink name (e.g. "http").
    fn name(&self) -> &str;

    /// Deliver a finished attempt and return the receipt.
    async fn submit(&self, payload: &SimulationPayload) -> anyhow::Result<SubmissionReceipt>;
}
