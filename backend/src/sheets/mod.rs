use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde_json::Value;
use tracing::debug;

use crate::models::{CellUpdate, ScriptReply};

/// Why a single cell update did not go through. Rendered verbatim into the
/// item's `erro` field.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("request to update script failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("update script returned invalid JSON: {0}")]
    InvalidReply(String),

    #[error("{0}")]
    Rejected(String),
}

/// Client for the Apps Script web app that writes spreadsheet cells.
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    script_url: Arc<str>,
}

impl SheetsClient {
    pub fn new(script_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for the update script")?;

        Ok(Self {
            http,
            script_url: Arc::from(script_url),
        })
    }

    /// Sends one `updateCell` call. Only a `2xx` with a truthy `success`
    /// counts as success; the full reply is returned so callers can echo it.
    pub async fn update_cell(&self, update: &CellUpdate) -> Result<Value, SheetsError> {
        let response = self
            .http
            .post(self.script_url.as_ref())
            .json(update)
            .send()
            .await?;

        let status = response.status();
        debug!(range = %update.range, status = status.as_u16(), "Update script responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let reply: Value =
            serde_json::from_str(&text).map_err(|e| SheetsError::InvalidReply(e.to_string()))?;
        let parsed: ScriptReply = serde_json::from_value(reply.clone())
            .map_err(|e| SheetsError::InvalidReply(e.to_string()))?;

        if !parsed.is_success() {
            return Err(SheetsError::Rejected(
                parsed
                    .error_message()
                    .unwrap_or_else(|| "update script reported a failure".to_string()),
            ));
        }

        Ok(reply)
    }
}
