//! Published payload retrieval
//!
//! The install workflow downloads the published install script before
//! touching the Pi, as a preflight check that the release is reachable
//! from this machine. The Pi fetches its own copy during installation.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::constants::INSTALL_SCRIPT_URL;

/// Fetches the published install script
#[async_trait]
pub trait PayloadSource: Send + Sync {
    async fn fetch(&self, timeout: Duration) -> Result<String>;
}

/// Production source fetching over HTTPS
pub struct HttpPayloadSource {
    url: String,
}

impl HttpPayloadSource {
    pub fn new() -> Self {
        Self {
            url: INSTALL_SCRIPT_URL.to_string(),
        }
    }
}

impl Default for HttpPayloadSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PayloadSource for HttpPayloadSource {
    async fn fetch(&self, timeout: Duration) -> Result<String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("DreamPiInstaller/1.0")
            .build()
            .context("Failed to build HTTP client")?;

        let response = client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to download {}", self.url))?
            .error_for_status()
            .with_context(|| format!("Server rejected request for {}", self.url))?;

        let body = response
            .text()
            .await
            .context("Failed to read script body")?;
        validate_payload(body)
    }
}

/// An empty body means a bad release artifact, not a usable script.
fn validate_payload(body: String) -> Result<String> {
    if body.trim().is_empty() {
        bail!("Downloaded script is empty");
    }
    Ok(body)
}
