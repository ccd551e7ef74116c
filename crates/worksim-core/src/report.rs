//! Attempt reports with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{AttemptScore, SubmissionReceipt};
use crate::attempt::{Attempt, FinishReason};
use crate::model::{Candidate, Submission};

/// A complete record of one attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Attempt identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub category_id: String,
    pub candidate: Candidate,
    /// `None` if the report was taken before the attempt finished.
    pub finish_reason: Option<FinishReason>,
    /// Number of tasks in the category.
    pub catalog_len: usize,
    pub submissions: Vec<Submission>,
    /// Aggregated score, once computed.
    pub score: Option<AttemptScore>,
    /// Sink receipt, once accepted.
    pub receipt: Option<SubmissionReceipt>,
    /// Wall-clock duration from start to report, in milliseconds.
    pub duration_ms: u64,
}

impl AttemptReport {
    /// Snapshot an attempt, timed on the attempt's own clock.
    pub fn from_attempt(attempt: &Attempt) -> Self {
        let created_at = attempt.now();
        let duration_ms = (created_at - attempt.started_at())
            .num_milliseconds()
            .max(0) as u64;

        Self {
            id: attempt.id(),
            created_at,
            category_id: attempt.category_id().to_string(),
            candidate: attempt.candidate().clone(),
            finish_reason: attempt.finish_reason(),
            catalog_len: attempt.catalog_len(),
            submissions: attempt.submissions().to_vec(),
            score: attempt.score(),
            receipt: attempt.receipt().cloned(),
            duration_ms,
        }
    }

    /// Tasks that never received a submission.
    pub fn unattempted(&self) -> usize {
        self.catalog_len.saturating_sub(self.submissions.len())
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
