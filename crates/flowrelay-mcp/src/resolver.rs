//! Endpoint discovery: find the first candidate host that answers.

use std::time::Duration;

use crate::error::{McpError, Result};

/// Message reported when no candidate answered.
pub const UNREACHABLE_MESSAGE: &str = "No n8n instance accessible";

/// Probes candidate base addresses in a fixed order.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    http: reqwest::Client,
    candidates: Vec<String>,
    probe_timeout: Duration,
}

impl EndpointResolver {
    /// Create a resolver over the given base addresses.
    pub fn new(candidates: Vec<String>, probe_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(probe_timeout)
            .build()
            .map_err(|e| McpError::Client(format!("failed to build probe client: {}", e)))?;

        Ok(Self {
            http,
            candidates,
            probe_timeout,
        })
    }

    /// Return the first candidate whose root answers `200 OK`.
    ///
    /// Probe failures of any kind just move on to the next candidate.
    pub async fn resolve(&self) -> Option<String> {
        for candidate in &self.candidates {
            let probe_url = format!("{}/", candidate.trim_end_matches('/'));
            tracing::debug!(url = %probe_url, "probing workflow server");

            match self
                .http
                .get(&probe_url)
                .timeout(self.probe_timeout)
                .send()
                .await
            {
                Ok(response) if response.status() == reqwest::StatusCode::OK => {
                    tracing::info!(url = %candidate, "workflow server reachable");
                    return Some(candidate.clone());
                }
                Ok(response) => {
                    tracing::debug!(
                        url = %probe_url,
                        status = response.status().as_u16(),
                        "probe answered without success"
                    );
                }
                Err(e) => {
                    tracing::debug!(url = %probe_url, error = %e, "probe failed");
                }
            }
        }

        None
    }

    /// `(reachable, address)`; the address is [`UNREACHABLE_MESSAGE`] on
    /// failure.
    pub async fn test_connectivity(&self) -> (bool, String) {
        match self.resolve().await {
            Some(url) => (true, url),
            None => (false, UNREACHABLE_MESSAGE.to_string()),
        }
    }
}
