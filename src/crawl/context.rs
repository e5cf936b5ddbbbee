//! Per-page view handed to the request handler
//!
//! The context exposes the three stateful effects a handler performs:
//! enqueueing discovered links, appending a dataset record, and mutating
//! the shared state blob. The effects are deliberately not transactional;
//! an interruption between any two of them is the mismatch window the
//! lifecycle handlers exist to shrink.

use anyhow::Result;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

use crate::storage::Dataset;

use super::fetcher::FetchedPage;
use super::link_extractor::{extract_links, should_enqueue_url};
use super::request_queue::RequestQueue;
use super::types::QueuedRequest;

/// Everything a request handler can see and do for one fetched page
pub struct CrawlContext<S> {
    request: QueuedRequest,
    loaded_url: String,
    body: String,
    base: Url,
    max_depth: u8,
    queue: Arc<RequestQueue>,
    dataset: Arc<Dataset>,
    state: Arc<RwLock<S>>,
}

impl<S> CrawlContext<S> {
    pub(crate) fn new(
        request: QueuedRequest,
        page: FetchedPage,
        base: Url,
        max_depth: u8,
        queue: Arc<RequestQueue>,
        dataset: Arc<Dataset>,
        state: Arc<RwLock<S>>,
    ) -> Self {
        Self {
            request,
            loaded_url: page.loaded_url,
            body: page.body,
            base,
            max_depth,
            queue,
            dataset,
            state,
        }
    }

    /// The request this page was fetched for
    #[must_use]
    pub fn request(&self) -> &QueuedRequest {
        &self.request
    }

    /// Final URL after redirects
    #[must_use]
    pub fn loaded_url(&self) -> &str {
        &self.loaded_url
    }

    /// Raw HTML body
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Extract same-host links from the page and add them to the queue
    ///
    /// Returns the number of newly enqueued URLs. Pages at the configured
    /// maximum depth enqueue nothing.
    pub async fn enqueue_links(&self) -> Result<usize> {
        if self.request.depth >= self.max_depth {
            log::debug!("Not enqueueing from {} (max depth)", self.loaded_url);
            return Ok(0);
        }

        let links = extract_links(&self.body, &self.base);
        let mut enqueued = 0;
        for link in links {
            if !should_enqueue_url(&link, &self.base) {
                continue;
            }
            let request = QueuedRequest::new(link, self.request.depth + 1);
            if self.queue.add_request(request).await {
                enqueued += 1;
            }
        }
        log::debug!("Enqueued {enqueued} links from {}", self.loaded_url);
        Ok(enqueued)
    }

    /// Append one record to the output dataset
    pub async fn push_data<T: Serialize + ?Sized>(&self, item: &T) -> Result<usize> {
        self.dataset.push_data(item).await
    }

    /// Shared mutable state blob for this crawl
    ///
    /// The same cell is persisted by the lifecycle handlers; mutations are
    /// visible to them immediately.
    #[must_use]
    pub fn state(&self) -> Arc<RwLock<S>> {
        Arc::clone(&self.state)
    }
}
