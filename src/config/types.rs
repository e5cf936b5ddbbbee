//! Core configuration types for the crawling actor
//!
//! This module contains the main `ActorConfig` struct that defines the
//! configuration parameters for a crawl run and its platform surface.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::{
    DEFAULT_AUTOSAVE_INTERVAL_MS, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_REQUEST_RETRIES, DEFAULT_PERSIST_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Main configuration struct for a crawl-actor run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Root directory for the key-value store and dataset.
    ///
    /// **INVARIANT:** Always an absolute path (normalized in builder).
    /// This keeps path operations consistent across both stores.
    pub(crate) storage_dir: PathBuf,
    pub(crate) start_url: String,
    pub(crate) max_depth: u8,
    pub(crate) max_concurrency: usize,
    pub(crate) max_request_retries: u8,
    pub(crate) page_limit: Option<usize>,
    pub(crate) request_timeout_secs: u64,

    /// Grace delay before persisting on a migration/abort notification.
    ///
    /// Milliseconds so tests can shrink it below a second. Default 10s.
    pub(crate) persist_delay_ms: u64,

    /// Interval between periodic `PersistState` ticks. Default 60s.
    pub(crate) autosave_interval_ms: u64,

    /// Platform API base URL. Absent on local runs.
    pub(crate) api_base_url: Option<String>,

    /// Identifier of the current actor run, assigned by the platform.
    pub(crate) actor_run_id: Option<String>,

    /// Platform API token. Absent on local runs.
    pub(crate) api_token: Option<String>,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("./storage"),
            start_url: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_request_retries: DEFAULT_MAX_REQUEST_RETRIES,
            page_limit: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            persist_delay_ms: DEFAULT_PERSIST_DELAY_MS,
            autosave_interval_ms: DEFAULT_AUTOSAVE_INTERVAL_MS,
            api_base_url: None,
            actor_run_id: None,
            api_token: None,
        }
    }
}

impl ActorConfig {
    #[must_use]
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    #[must_use]
    pub fn start_url(&self) -> &str {
        &self.start_url
    }

    #[must_use]
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    #[must_use]
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    #[must_use]
    pub fn max_request_retries(&self) -> u8 {
        self.max_request_retries
    }

    #[must_use]
    pub fn page_limit(&self) -> Option<usize> {
        self.page_limit
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Grace delay before interruption persistence
    #[must_use]
    pub fn persist_delay(&self) -> Duration {
        Duration::from_millis(self.persist_delay_ms)
    }

    /// Interval between periodic autosave ticks
    #[must_use]
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }

    #[must_use]
    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }

    #[must_use]
    pub fn actor_run_id(&self) -> Option<&str> {
        self.actor_run_id.as_deref()
    }

    #[must_use]
    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }
}
