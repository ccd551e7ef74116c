//! JSON-over-HTTP submission sink.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use worksim_core::aggregate::{SimulationPayload, SubmissionReceipt};
use worksim_core::traits::SubmissionSink;

use crate::error::SinkError;

const SUBMIT_PATH: &str = "/api/simulations/submissions";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Posts finished attempts to the platform backend.
pub struct HttpSink {
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpSink {
    pub fn new(base_url: &str, api_key: Option<String>) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout_secs,
            client,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, SUBMIT_PATH)
    }
}

#[derive(Deserialize)]
struct ReceiptResponse {
    percentage: f64,
    id: serde_json::Value,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(alias = "error")]
    message: String,
}

#[async_trait]
impl SubmissionSink for HttpSink {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, payload), fields(category = %payload.category_id))]
    async fn submit(&self, payload: &SimulationPayload) -> anyhow::Result<SubmissionReceipt> {
        let mut request = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json")
            .json(payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SinkError::Timeout(self.timeout_secs)
            } else {
                SinkError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Unauthorized(body).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(SinkError::Rejected { status, message }.into());
        }

        let receipt: ReceiptResponse = response.json().await.map_err(|e| SinkError::Rejected {
            status,
            message: format!("failed to parse receipt: {e}"),
        })?;

        let id = match receipt.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        tracing::debug!(%id, percentage = receipt.percentage, "receipt received");

        Ok(SubmissionReceipt {
            percentage: receipt.percentage,
            id,
        })
    }
}
