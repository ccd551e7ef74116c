//! Directory-backed submission sink for offline runs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use worksim_core::aggregate::{SimulationPayload, SubmissionReceipt};
use worksim_core::traits::SubmissionSink;

use crate::error::SinkError;

/// Writes each payload as pretty JSON into a directory.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a payload with this receipt id is written to.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("submission-{id}.json"))
    }
}

#[async_trait]
impl SubmissionSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    async fn submit(&self, payload: &SimulationPayload) -> anyhow::Result<SubmissionReceipt> {
        let id = Uuid::new_v4().to_string();
        let path = self.path_for(&id);
        let json = serde_json::to_string_pretty(payload)
            .map_err(|e| SinkError::Storage(format!("failed to serialize payload: {e}")))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SinkError::Storage(format!("{}: {e}", self.dir.display())))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| SinkError::Storage(format!("{}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), "submission written");

        Ok(SubmissionReceipt {
            percentage: payload.breakdown.mean(),
            id,
        })
    }
}
