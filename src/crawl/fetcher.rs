//! Page fetching over plain HTTP
//!
//! One shared `reqwest` client with connection pooling serves all worker
//! tasks. Redirects are followed by the client, so `loaded_url` is the URL
//! the body was actually served from.

use anyhow::{Context, Result, bail};
use std::time::Duration;

use crate::utils::USER_AGENT;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub loaded_url: String,
    pub status: u16,
    pub body: String,
}

/// Shared HTTP client for page requests
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Build a fetcher with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Fetch a page, returning its final URL and body
    ///
    /// # Errors
    ///
    /// Transport failures and non-success statuses are both errors; the
    /// caller classifies them for retry via `FailureKind`.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = response.status();
        let loaded_url = response.url().to_string();

        if !status.is_success() {
            bail!("HTTP status {status} for {loaded_url}");
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {loaded_url}"))?;

        Ok(FetchedPage {
            loaded_url,
            status: status.as_u16(),
            body,
        })
    }
}
