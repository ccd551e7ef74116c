//! Result aggregation and the submission payload.
//!
//! The overall percentage divides by the full catalog length, so tasks that
//! were never reached (early expiry) count as zero. The four breakdown
//! dimensions are the average plus a small random offset each.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::model::{Answer, Candidate, Submission};

/// Largest absolute offset applied to a breakdown dimension.
pub const MAX_JITTER: i32 = 5;

/// Source of per-dimension offsets.
pub trait JitterSource {
    /// An offset in `[-MAX_JITTER, MAX_JITTER]`.
    fn offset(&mut self) -> i32;
}

/// Reproducible offsets from a seeded RNG.
pub struct SeededJitter {
    rng: StdRng,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Offsets seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl JitterSource for SeededJitter {
    fn offset(&mut self) -> i32 {
        self.rng.gen_range(-MAX_JITTER..=MAX_JITTER)
    }
}

/// No offsets: every dimension equals the average.
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn offset(&mut self) -> i32 {
        0
    }
}

/// The four named sub-scores reported alongside the percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub technical: u8,
    pub creativity: u8,
    pub efficiency: u8,
    pub communication: u8,
}

impl Breakdown {
    /// Mean of the four dimensions.
    pub fn mean(&self) -> f64 {
        let sum = u32::from(self.technical)
            + u32::from(self.creativity)
            + u32::from(self.efficiency)
            + u32::from(self.communication);
        f64::from(sum) / 4.0
    }
}

/// Aggregated score for a finished attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptScore {
    pub average_score: u8,
    pub breakdown: Breakdown,
}

/// Reduce submissions to an average and a jittered breakdown.
pub fn aggregate(
    submissions: &[Submission],
    catalog_len: usize,
    jitter: &mut dyn JitterSource,
) -> AttemptScore {
    let average_score = average_score(submissions, catalog_len);
    let mut dimension = || {
        (i32::from(average_score) + jitter.offset()).clamp(0, 100) as u8
    };

    AttemptScore {
        average_score,
        breakdown: Breakdown {
            technical: dimension(),
            creativity: dimension(),
            efficiency: dimension(),
            communication: dimension(),
        },
    }
}

/// `round(sum(score) / catalog_len)`, or 0 for an empty catalog.
pub fn average_score(submissions: &[Submission], catalog_len: usize) -> u8 {
    if catalog_len == 0 {
        return 0;
    }
    let total: u32 = submissions.iter().map(|s| u32::from(s.score)).sum();
    (f64::from(total) / catalog_len as f64).round().clamp(0.0, 100.0) as u8
}

// ---------------------------------------------------------------------------
// Sink payload
// ---------------------------------------------------------------------------

/// Per-task entry in the submission payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub task_id: String,
    pub answer: Answer,
    pub time_spent: u64,
    pub score: u8,
}

/// Everything the submission sink receives for one attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationPayload {
    pub category_id: String,
    pub candidate: Candidate,
    pub task_results: Vec<TaskResult>,
    pub breakdown: Breakdown,
}

impl SimulationPayload {
    pub fn new(
        category_id: &str,
        candidate: &Candidate,
        submissions: &[Submission],
        breakdown: Breakdown,
    ) -> Self {
        Self {
            category_id: category_id.to_string(),
            candidate: candidate.clone(),
            task_results: submissions
                .iter()
                .map(|s| TaskResult {
                    task_id: s.task_id.clone(),
                    answer: s.answer.clone(),
                    time_spent: s.time_spent_secs,
                    score: s.score,
                })
                .collect(),
            breakdown,
        }
    }
}

/// What the sink hands back: used for post-attempt navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub percentage: f64,
    pub id: String,
}
