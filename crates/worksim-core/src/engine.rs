//! Simulation engine driver.
//!
//! Wires a task catalog and a submission sink to the attempt state machine,
//! drives the per-attempt clock on the tokio runtime, and performs the final
//! hand-off of results.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::aggregate::{aggregate, SeededJitter, SimulationPayload, SubmissionReceipt};
use crate::attempt::{Attempt, AttemptPhase, FinishReason};
use crate::catalog::TaskCatalog;
use crate::error::EngineError;
use crate::model::{Candidate, Task};
use crate::timer::{Clock, SystemClock, TickOutcome};
use crate::traits::SubmissionSink;

/// An attempt shared between the clock task and user input.
///
/// Every mutation of the attempt happens while holding this one lock.
pub type AttemptHandle = Arc<Mutex<Attempt>>;

/// Configuration for the simulation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Attempt time budget. Defaults to the sum of task time limits.
    pub time_limit_override_secs: Option<u64>,
    /// Seed for breakdown jitter. `None` seeds from entropy.
    pub jitter_seed: Option<u64>,
    /// How often the clock task ticks. One tick is one second of budget.
    pub tick_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_limit_override_secs: None,
            jitter_seed: None,
            tick_interval: Duration::from_secs(1),
        }
    }
}

/// The central simulation engine.
pub struct SimulationEngine {
    catalog: Arc<dyn TaskCatalog>,
    sink: Arc<dyn SubmissionSink>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl SimulationEngine {
    pub fn new(
        catalog: Arc<dyn TaskCatalog>,
        sink: Arc<dyn SubmissionSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog,
            sink,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Use a different wall clock for per-task timing.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    /// Start an attempt for a category.
    ///
    /// Returns `None` when the category has no tasks.
    pub fn start(&self, category_id: &str, candidate: Candidate) -> Option<Attempt> {
        let tasks = self.catalog.tasks_for_category(category_id);
        if tasks.is_empty() {
            tracing::info!(category = %category_id, "no tasks for category, nothing to run");
            return None;
        }
        let time_limit = self.time_limit_for(&tasks);
        Attempt::new(
            category_id,
            candidate,
            tasks,
            time_limit,
            Arc::clone(&self.clock),
        )
    }

    /// Start an attempt wrapped in a shared handle.
    pub fn start_shared(&self, category_id: &str, candidate: Candidate) -> Option<AttemptHandle> {
        self.start(category_id, candidate)
            .map(|attempt| Arc::new(Mutex::new(attempt)))
    }

    /// The attempt time budget for a task list.
    pub fn time_limit_for(&self, tasks: &[Task]) -> u64 {
        self.config
            .time_limit_override_secs
            .unwrap_or_else(|| tasks.iter().map(Task::time_limit_secs).sum())
    }

    /// Drive the attempt's timer until it stops.
    ///
    /// Resolves to the finish reason once the attempt is no longer active.
    pub fn spawn_clock(&self, handle: AttemptHandle) -> JoinHandle<Option<FinishReason>> {
        spawn_clock(handle, self.config.tick_interval)
    }

    /// Aggregate a finished attempt and hand it to the sink.
    ///
    /// On sink failure the attempt returns to `Finished` with its
    /// submissions and score intact, so the call can be repeated.
    ///
    /// Dropping the returned future mid-send (a timeout, a `select!`, an
    /// aborted task) also leaves the attempt `Finished`.
    pub async fn finalize(&self, attempt: &mut Attempt) -> Result<SubmissionReceipt, EngineError> {
        attempt.begin_submitting()?;
        let mut hand_off = HandOff { attempt };
        let attempt = &mut *hand_off.attempt;

        let score = match attempt.score() {
            Some(score) => score,
            None => {
                let mut jitter = self.jitter();
                let score = aggregate(attempt.submissions(), attempt.catalog_len(), &mut jitter);
                attempt.set_score(score);
                score
            }
        };

        let payload = SimulationPayload::new(
            attempt.category_id(),
            attempt.candidate(),
            attempt.submissions(),
            score.breakdown,
        );

        tracing::info!(
            attempt = %attempt.id(),
            sink = self.sink.name(),
            average = score.average_score,
            tasks = payload.task_results.len(),
            "submitting attempt results"
        );

        match self.sink.submit(&payload).await {
            Ok(receipt) => {
                tracing::info!(attempt = %attempt.id(), receipt = %receipt.id, "results accepted");
                attempt.complete_submission(receipt.clone());
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!(attempt = %attempt.id(), "submission failed: {e:#}");
                attempt.abort_submission();
                Err(EngineError::SinkFailure(format!("{e:#}")))
            }
        }
    }

    /// [`finalize`](Self::finalize) through a shared handle.
    pub async fn finalize_shared(
        &self,
        handle: &AttemptHandle,
    ) -> Result<SubmissionReceipt, EngineError> {
        let mut attempt = handle.lock().await;
        self.finalize(&mut attempt).await
    }

    fn jitter(&self) -> SeededJitter {
        match self.config.jitter_seed {
            Some(seed) => SeededJitter::new(seed),
            None => SeededJitter::from_entropy(),
        }
    }
}

/// Puts an attempt still in `Submitting` back to `Finished` when dropped.
struct HandOff<'a> {
    attempt: &'a mut Attempt,
}

impl Drop for HandOff<'_> {
    fn drop(&mut self) {
        if self.attempt.phase() == AttemptPhase::Submitting {
            tracing::warn!(
                attempt = %self.attempt.id(),
                "hand-off interrupted, attempt can be finalized again"
            );
            self.attempt.abort_submission();
        }
    }
}

/// Tick an attempt once per `tick_interval` until it leaves `Active`.
pub fn spawn_clock(
    handle: AttemptHandle,
    tick_interval: Duration,
) -> JoinHandle<Option<FinishReason>> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            let mut attempt = handle.lock().await;
            match attempt.tick() {
                TickOutcome::Expired | TickOutcome::Stopped => {
                    return attempt.finish_reason();
                }
                TickOutcome::Running { .. } | TickOutcome::Paused => {}
            }
        }
    })
}
