//! Countdown timer and wall clock abstraction.
//!
//! The timer knows nothing about rendering or real time: something else
//! calls [`TimerController::tick`] once per elapsed second. The [`Clock`]
//! trait supplies wall-clock readings for per-task elapsed time.

use std::sync::Mutex;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

/// Timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Running,
    Paused,
    Expired,
    /// Halted before running out, because the attempt finished early.
    Stopped,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One second was consumed.
    Running { remaining_secs: u64 },
    /// The timer is paused; nothing was consumed.
    Paused,
    /// This tick consumed the last second. Reported exactly once.
    Expired,
    /// The timer had already expired or was halted.
    Stopped,
}

/// Single countdown clock for one attempt.
#[derive(Debug, Clone)]
pub struct TimerController {
    total_secs: u64,
    remaining_secs: u64,
    state: TimerState,
}

impl TimerController {
    /// A running timer. A zero budget starts out expired.
    pub fn new(total_secs: u64) -> Self {
        let state = if total_secs == 0 {
            TimerState::Expired
        } else {
            TimerState::Running
        };
        Self {
            total_secs,
            remaining_secs: total_secs,
            state,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        match self.state {
            TimerState::Paused => TickOutcome::Paused,
            TimerState::Expired | TimerState::Stopped => TickOutcome::Stopped,
            TimerState::Running => {
                self.remaining_secs = self.remaining_secs.saturating_sub(1);
                if self.remaining_secs == 0 {
                    self.state = TimerState::Expired;
                    tracing::debug!("timer expired");
                    TickOutcome::Expired
                } else {
                    TickOutcome::Running {
                        remaining_secs: self.remaining_secs,
                    }
                }
            }
        }
    }

    /// Returns `true` if the timer moved from running to paused.
    pub fn pause(&mut self) -> bool {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
            true
        } else {
            false
        }
    }

    /// Returns `true` if the timer moved from paused to running.
    pub fn resume(&mut self) -> bool {
        if self.state == TimerState::Paused {
            self.state = TimerState::Running;
            true
        } else {
            false
        }
    }

    /// Stop ticking for good without reporting an expiry.
    ///
    /// An already expired timer keeps its `Expired` state.
    pub(crate) fn halt(&mut self) {
        if self.state != TimerState::Expired {
            self.state = TimerState::Stopped;
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.total_secs - self.remaining_secs
    }
}

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += ChronoDuration::seconds(secs);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Whole seconds between two instants, never negative.
pub fn secs_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    (end - start).num_seconds().max(0) as u64
}
