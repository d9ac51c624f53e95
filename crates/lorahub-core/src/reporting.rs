// ── Uplink reporting ──
//
// After ingestion, uplinks are forwarded to the owning application's
// configured destination. A trait seam so tests can capture deliveries.

use async_trait::async_trait;
use tracing::debug;

use crate::error::CoreError;

/// Delivers uplink payloads to an application's reporting destination.
#[async_trait]
pub trait UplinkForwarder: Send + Sync {
    async fn forward(
        &self,
        destination: &str,
        payload: &serde_json::Value,
    ) -> Result<(), CoreError>;
}

/// POSTs uplinks as JSON to the destination URL.
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    http: reqwest::Client,
}

impl HttpForwarder {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Default for HttpForwarder {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl UplinkForwarder for HttpForwarder {
    async fn forward(
        &self,
        destination: &str,
        payload: &serde_json::Value,
    ) -> Result<(), CoreError> {
        debug!(destination, "forwarding uplink");
        let resp = self
            .http
            .post(destination)
            .json(payload)
            .send()
            .await
            .map_err(|e| CoreError::ConnectionFailed {
                url: destination.to_owned(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Remote {
                message: format!("uplink destination rejected delivery: HTTP {status}"),
                status: Some(status.as_u16()),
            });
        }
        Ok(())
    }
}
