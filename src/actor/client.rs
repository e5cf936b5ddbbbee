//! Platform API client
//!
//! The only platform operation this actor needs is the managed reboot of
//! its own run, issued at the end of the migration handler. Local runs
//! have no run id or token; calling `reboot` there is an error.

use anyhow::{Context, Result, anyhow};
use std::time::Duration;

use crate::config::ActorConfig;
use crate::utils::{DEFAULT_REQUEST_TIMEOUT_SECS, USER_AGENT};

/// Client for the hosting platform's run-management API
#[derive(Debug, Clone)]
pub struct PlatformClient {
    http: reqwest::Client,
    api_base_url: Option<String>,
    run_id: Option<String>,
    token: Option<String>,
}

impl PlatformClient {
    /// Build a client from the actor configuration
    pub fn new(config: &ActorConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build platform API client")?;
        Ok(Self {
            http,
            api_base_url: config.api_base_url().map(str::to_string),
            run_id: config.actor_run_id().map(str::to_string),
            token: config.api_token().map(str::to_string),
        })
    }

    /// Whether this process is running on the platform
    ///
    /// True when a run id and API base URL were provided by the
    /// environment; local runs have neither.
    #[must_use]
    pub fn is_at_home(&self) -> bool {
        self.run_id.is_some() && self.api_base_url.is_some()
    }

    /// Request a managed reboot of the current run
    ///
    /// The platform restarts the run on its new machine; this process is
    /// terminated shortly after the call returns.
    pub async fn reboot(&self) -> Result<()> {
        let api_base = self.api_base_url.as_deref().ok_or_else(|| {
            anyhow!("No platform API base URL configured; reboot is only available on the platform")
        })?;
        let run_id = self
            .run_id
            .as_deref()
            .ok_or_else(|| anyhow!("No actor run id configured; cannot reboot a local run"))?;

        let url = format!(
            "{}/v2/actor-runs/{run_id}/reboot",
            api_base.trim_end_matches('/')
        );
        let mut request = self.http.post(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Reboot request to {url} failed"))?;
        response
            .error_for_status()
            .context("Platform rejected the reboot request")?;

        tracing::info!("Reboot of run {run_id} requested");
        Ok(())
    }
}
