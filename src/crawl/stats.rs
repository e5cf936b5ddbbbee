//! Crawl statistics with snapshot persistence
//!
//! Counters are atomics so worker tasks update them without locking; the
//! persisted snapshot carries the original start time across reboots.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::storage::KeyValueStore;
use crate::utils::CRAWLER_STATISTICS_KEY;

/// Snapshot of crawl statistics written to the key-value store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlStatsState {
    pub requests_finished: u64,
    pub requests_failed: u64,
    pub retry_count: u64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub persisted_at: chrono::DateTime<chrono::Utc>,
}

/// Live crawl statistics shared across worker tasks
#[derive(Debug)]
pub struct CrawlStats {
    started_at: chrono::DateTime<chrono::Utc>,
    requests_finished: AtomicU64,
    requests_failed: AtomicU64,
    retry_count: AtomicU64,
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self {
            started_at: chrono::Utc::now(),
            requests_finished: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            retry_count: AtomicU64::new(0),
        }
    }
}

impl CrawlStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild statistics from the last persisted snapshot, if any
    pub async fn restore(kv: &KeyValueStore) -> anyhow::Result<Self> {
        match kv
            .get_value::<CrawlStatsState>(CRAWLER_STATISTICS_KEY)
            .await?
        {
            Some(state) => {
                log::info!(
                    "Restoring crawl statistics: {} finished, {} failed",
                    state.requests_finished,
                    state.requests_failed
                );
                Ok(Self {
                    started_at: state.started_at,
                    requests_finished: AtomicU64::new(state.requests_finished),
                    requests_failed: AtomicU64::new(state.requests_failed),
                    retry_count: AtomicU64::new(state.retry_count),
                })
            }
            None => Ok(Self::new()),
        }
    }

    pub fn record_finished(&self) {
        self.requests_finished.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_retry(&self) {
        self.retry_count.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn requests_finished(&self) -> u64 {
        self.requests_finished.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn requests_failed(&self) -> u64 {
        self.requests_failed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn retry_count(&self) -> u64 {
        self.retry_count.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn started_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.started_at
    }

    /// Snapshot the current counters
    #[must_use]
    pub fn snapshot(&self) -> CrawlStatsState {
        CrawlStatsState {
            requests_finished: self.requests_finished(),
            requests_failed: self.requests_failed(),
            retry_count: self.retry_count(),
            started_at: self.started_at,
            persisted_at: chrono::Utc::now(),
        }
    }

    /// Write the statistics snapshot to the key-value store
    pub async fn persist(&self, kv: &KeyValueStore) -> anyhow::Result<()> {
        kv.set_value(CRAWLER_STATISTICS_KEY, &self.snapshot()).await
    }
}
