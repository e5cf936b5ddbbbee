//! Environment-variable overrides for `ActorConfig`
//!
//! On the hosting platform the actor is configured through `ACTOR_*`
//! environment variables; locally the defaults apply.

use anyhow::{Context, Result};
use std::env;

use super::types::ActorConfig;

/// Fallback seed when `ACTOR_START_URL` is unset
const FALLBACK_START_URL: &str = "https://example.com";

fn parsed_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => {
            let value = raw
                .parse::<T>()
                .with_context(|| format!("Invalid value for {name}: '{raw}'"))?;
            Ok(Some(value))
        }
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {name}")),
    }
}

impl ActorConfig {
    /// Build a configuration from `ACTOR_*` environment variables
    ///
    /// Recognized variables: `ACTOR_STORAGE_DIR`, `ACTOR_START_URL`,
    /// `ACTOR_MAX_DEPTH`, `ACTOR_MAX_CONCURRENCY`, `ACTOR_PAGE_LIMIT`,
    /// `ACTOR_PERSIST_DELAY_MS`, `ACTOR_AUTOSAVE_INTERVAL_MS`,
    /// `ACTOR_API_BASE_URL`, `ACTOR_RUN_ID`, `ACTOR_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but unparseable, or when
    /// the resulting configuration fails builder validation.
    pub fn from_env() -> Result<Self> {
        let storage_dir =
            env::var("ACTOR_STORAGE_DIR").unwrap_or_else(|_| "./storage".to_string());
        let start_url =
            env::var("ACTOR_START_URL").unwrap_or_else(|_| FALLBACK_START_URL.to_string());

        let mut builder = Self::builder().storage_dir(storage_dir).start_url(start_url);

        if let Some(depth) = parsed_var::<u8>("ACTOR_MAX_DEPTH")? {
            builder = builder.max_depth(depth);
        }
        if let Some(concurrency) = parsed_var::<usize>("ACTOR_MAX_CONCURRENCY")? {
            builder = builder.max_concurrency(concurrency);
        }
        if let Some(limit) = parsed_var::<usize>("ACTOR_PAGE_LIMIT")? {
            builder = builder.page_limit(limit);
        }
        if let Some(delay) = parsed_var::<u64>("ACTOR_PERSIST_DELAY_MS")? {
            builder = builder.persist_delay_ms(delay);
        }
        if let Some(interval) = parsed_var::<u64>("ACTOR_AUTOSAVE_INTERVAL_MS")? {
            builder = builder.autosave_interval_ms(interval);
        }
        if let Ok(base) = env::var("ACTOR_API_BASE_URL") {
            builder = builder.api_base_url(base);
        }
        if let Ok(run_id) = env::var("ACTOR_RUN_ID") {
            builder = builder.actor_run_id(run_id);
        }
        if let Ok(token) = env::var("ACTOR_API_TOKEN") {
            builder = builder.api_token(token);
        }

        builder.build()
    }
}
