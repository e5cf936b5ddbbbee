//! Type-safe builder for `ActorConfig` using the typestate pattern
//!
//! This module provides a fluent builder interface with compile-time
//! validation ensuring that required fields are set before building an
//! `ActorConfig`.

use anyhow::{Result, anyhow};
use std::marker::PhantomData;
use std::path::PathBuf;
use url::Url;

use super::types::ActorConfig;

// Type states for the builder
pub struct WithStorageDir;
pub struct WithStartUrl;

pub struct ActorConfigBuilder<State = ()> {
    pub(crate) storage_dir: Option<PathBuf>,
    pub(crate) start_url: Option<String>,
    pub(crate) max_depth: u8,
    pub(crate) max_concurrency: usize,
    pub(crate) max_request_retries: u8,
    pub(crate) page_limit: Option<usize>,
    pub(crate) request_timeout_secs: u64,
    pub(crate) persist_delay_ms: u64,
    pub(crate) autosave_interval_ms: u64,
    pub(crate) api_base_url: Option<String>,
    pub(crate) actor_run_id: Option<String>,
    pub(crate) api_token: Option<String>,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for ActorConfigBuilder<()> {
    fn default() -> Self {
        let defaults = ActorConfig::default();
        Self {
            storage_dir: None,
            start_url: None,
            max_depth: defaults.max_depth,
            max_concurrency: defaults.max_concurrency,
            max_request_retries: defaults.max_request_retries,
            page_limit: None,
            request_timeout_secs: defaults.request_timeout_secs,
            persist_delay_ms: defaults.persist_delay_ms,
            autosave_interval_ms: defaults.autosave_interval_ms,
            api_base_url: None,
            actor_run_id: None,
            api_token: None,
            _phantom: PhantomData,
        }
    }
}

impl ActorConfig {
    /// Create a builder for configuring an `ActorConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ActorConfigBuilder<()> {
        ActorConfigBuilder::default()
    }
}

impl ActorConfigBuilder<()> {
    pub fn storage_dir(self, dir: impl Into<PathBuf>) -> ActorConfigBuilder<WithStorageDir> {
        ActorConfigBuilder {
            storage_dir: Some(dir.into()),
            start_url: self.start_url,
            max_depth: self.max_depth,
            max_concurrency: self.max_concurrency,
            max_request_retries: self.max_request_retries,
            page_limit: self.page_limit,
            request_timeout_secs: self.request_timeout_secs,
            persist_delay_ms: self.persist_delay_ms,
            autosave_interval_ms: self.autosave_interval_ms,
            api_base_url: self.api_base_url,
            actor_run_id: self.actor_run_id,
            api_token: self.api_token,
            _phantom: PhantomData,
        }
    }
}

impl ActorConfigBuilder<WithStorageDir> {
    pub fn start_url(self, url: impl Into<String>) -> ActorConfigBuilder<WithStartUrl> {
        let url_string = url.into();

        // Normalize URL: add https:// if no scheme is present
        let normalized_url =
            if url_string.starts_with("http://") || url_string.starts_with("https://") {
                url_string
            } else {
                format!("https://{url_string}")
            };

        ActorConfigBuilder {
            storage_dir: self.storage_dir,
            start_url: Some(normalized_url),
            max_depth: self.max_depth,
            max_concurrency: self.max_concurrency,
            max_request_retries: self.max_request_retries,
            page_limit: self.page_limit,
            request_timeout_secs: self.request_timeout_secs,
            persist_delay_ms: self.persist_delay_ms,
            autosave_interval_ms: self.autosave_interval_ms,
            api_base_url: self.api_base_url,
            actor_run_id: self.actor_run_id,
            api_token: self.api_token,
            _phantom: PhantomData,
        }
    }
}

// Optional setters, available in any state
impl<State> ActorConfigBuilder<State> {
    #[must_use]
    pub fn max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn max_concurrency(mut self, concurrency: usize) -> Self {
        self.max_concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn max_request_retries(mut self, retries: u8) -> Self {
        self.max_request_retries = retries;
        self
    }

    #[must_use]
    pub fn page_limit(mut self, limit: usize) -> Self {
        self.page_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn persist_delay_ms(mut self, millis: u64) -> Self {
        self.persist_delay_ms = millis;
        self
    }

    #[must_use]
    pub fn autosave_interval_ms(mut self, millis: u64) -> Self {
        self.autosave_interval_ms = millis;
        self
    }

    #[must_use]
    pub fn api_base_url(mut self, base: impl Into<String>) -> Self {
        self.api_base_url = Some(base.into());
        self
    }

    #[must_use]
    pub fn actor_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.actor_run_id = Some(run_id.into());
        self
    }

    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

// Build method only available when all required fields are set
impl ActorConfigBuilder<WithStartUrl> {
    pub fn build(self) -> Result<ActorConfig> {
        let storage_dir = self
            .storage_dir
            .ok_or_else(|| anyhow!("storage_dir is required"))?;
        let start_url = self
            .start_url
            .ok_or_else(|| anyhow!("start_url is required"))?;

        // Seed URL must parse; everything downstream assumes it does
        Url::parse(&start_url).map_err(|e| anyhow!("Invalid start URL '{start_url}': {e}"))?;

        if self.max_concurrency == 0 {
            return Err(anyhow!("max_concurrency must be at least 1"));
        }

        // Normalize storage_dir to an absolute path
        let storage_dir = if storage_dir.is_absolute() {
            storage_dir
        } else {
            std::env::current_dir()?.join(storage_dir)
        };

        Ok(ActorConfig {
            storage_dir,
            start_url,
            max_depth: self.max_depth,
            max_concurrency: self.max_concurrency,
            max_request_retries: self.max_request_retries,
            page_limit: self.page_limit,
            request_timeout_secs: self.request_timeout_secs,
            persist_delay_ms: self.persist_delay_ms,
            autosave_interval_ms: self.autosave_interval_ms,
            api_base_url: self.api_base_url,
            actor_run_id: self.actor_run_id,
            api_token: self.api_token,
        })
    }
}
