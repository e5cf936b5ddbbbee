//! Pending-work list with URL deduplication and snapshot persistence
//!
//! The queue is FIFO over not-yet-processed crawl targets. A lock-free
//! seen-set rejects URLs that were ever enqueued before, which also makes
//! restore idempotent: a restored run cannot re-enqueue URLs the previous
//! run already claimed.

use dashmap::DashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::storage::KeyValueStore;
use crate::utils::REQUEST_QUEUE_STATE_KEY;

use super::types::QueuedRequest;

/// Snapshot of the queue written to the key-value store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestQueueState {
    pub pending: Vec<QueuedRequest>,
    pub seen: Vec<String>,
    pub handled_count: usize,
    pub persisted_at: chrono::DateTime<chrono::Utc>,
}

/// FIFO queue of crawl targets shared across worker tasks
#[derive(Debug, Default)]
pub struct RequestQueue {
    pending: Mutex<VecDeque<QueuedRequest>>,
    seen: DashSet<String>,
    handled: AtomicUsize,
}

impl RequestQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a queue from the last persisted snapshot, if any
    pub async fn restore(kv: &KeyValueStore) -> anyhow::Result<Self> {
        let queue = Self::new();
        if let Some(state) = kv
            .get_value::<RequestQueueState>(REQUEST_QUEUE_STATE_KEY)
            .await?
        {
            log::info!(
                "Restoring request queue: {} pending, {} handled",
                state.pending.len(),
                state.handled_count
            );
            for url in state.seen {
                queue.seen.insert(url);
            }
            for request in &state.pending {
                queue.seen.insert(request.url.clone());
            }
            *queue.pending.lock().await = state.pending.into();
            queue.handled.store(state.handled_count, Ordering::SeqCst);
        }
        Ok(queue)
    }

    /// Enqueue a request unless its URL was already seen
    ///
    /// Returns true if the request was accepted.
    pub async fn add_request(&self, request: QueuedRequest) -> bool {
        if !self.seen.insert(request.url.clone()) {
            return false;
        }
        self.pending.lock().await.push_back(request);
        true
    }

    /// Put a claimed request back for another attempt
    ///
    /// Bypasses deduplication: the URL is already in the seen-set.
    pub async fn reclaim(&self, request: QueuedRequest) {
        log::debug!(
            "Reclaiming {} (attempt {})",
            request.url,
            request.retry_count
        );
        self.pending.lock().await.push_back(request);
    }

    /// Claim the next pending request
    pub async fn fetch_next(&self) -> Option<QueuedRequest> {
        self.pending.lock().await.pop_front()
    }

    /// Record that a claimed request will not come back
    pub fn mark_handled(&self) {
        self.handled.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn handled_count(&self) -> usize {
        self.handled.load(Ordering::SeqCst)
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }

    /// Snapshot the current queue contents
    pub async fn snapshot(&self) -> RequestQueueState {
        let pending: Vec<QueuedRequest> = self.pending.lock().await.iter().cloned().collect();
        RequestQueueState {
            pending,
            seen: self.seen.iter().map(|entry| entry.key().clone()).collect(),
            handled_count: self.handled_count(),
            persisted_at: chrono::Utc::now(),
        }
    }

    /// Write the pending-work snapshot to the key-value store
    pub async fn persist(&self, kv: &KeyValueStore) -> anyhow::Result<()> {
        let state = self.snapshot().await;
        log::debug!(
            "Persisting request queue: {} pending, {} handled",
            state.pending.len(),
            state.handled_count
        );
        kv.set_value(REQUEST_QUEUE_STATE_KEY, &state).await
    }
}
