//! Mock sink for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use worksim_core::aggregate::{SimulationPayload, SubmissionReceipt};
use worksim_core::traits::SubmissionSink;

use crate::error::SinkError;

/// A sink that records payloads in memory.
///
/// Can be told to fail a number of calls before accepting, to exercise the
/// retry path without a network.
pub struct MockSink {
    /// Calls left to fail.
    failures_remaining: AtomicU32,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Payloads accepted so far.
    accepted: Mutex<Vec<SimulationPayload>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::failing(0)
    }

    /// A sink that fails the first `failures` calls.
    pub fn failing(failures: u32) -> Self {
        Self {
            failures_remaining: AtomicU32::new(failures),
            call_count: AtomicU32::new(0),
            accepted: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn accepted(&self) -> Vec<SimulationPayload> {
        self.accepted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionSink for MockSink {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, payload: &SimulationPayload) -> anyhow::Result<SubmissionReceipt> {
        let call = self.call_count.fetch_add(1, Ordering::Relaxed) + 1;

        let should_fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(SinkError::Rejected {
                status: 503,
                message: "mock sink unavailable".into(),
            }
            .into());
        }

        self.accepted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(payload.clone());

        Ok(SubmissionReceipt {
            percentage: payload.breakdown.mean(),
            id: format!("mock-{call}"),
        })
    }
}
