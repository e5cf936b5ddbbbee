//! Bounded-concurrency crawler driving the per-page request handler
//!
//! The run loop claims pending requests up to the concurrency limit and
//! drains completions as they land. A watcher task subscribed to the
//! platform event bus suspends claiming as soon as a lifecycle event is
//! observed (in-flight handlers are allowed to finish, new work is not
//! started) and services the periodic autosave ticks.

use anyhow::{Context, Result};
use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use log::{debug, error, info, warn};
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use url::Url;

use crate::actor::Actor;
use crate::config::ActorConfig;
use crate::events::{EventBus, PlatformEvent};
use crate::storage::{Dataset, KeyValueStore};
use crate::utils::CRAWLER_STATE_KEY;

use super::context::CrawlContext;
use super::fetcher::Fetcher;
use super::request_queue::RequestQueue;
use super::stats::CrawlStats;
use super::types::{FailureKind, QueuedRequest};

/// Per-page handler invoked once for every successfully fetched page
pub type RequestHandler<S> =
    Arc<dyn Fn(CrawlContext<S>) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// HTTP crawler generic over the shared state blob `S`
///
/// `S` is the actor's custom mutable state: loaded lazily from the
/// key-value store, shared with every handler invocation through
/// `CrawlContext::state()`, and written back by `persist_state`.
pub struct HttpCrawler<S> {
    config: Arc<ActorConfig>,
    kv: Arc<KeyValueStore>,
    dataset: Arc<Dataset>,
    events: Arc<EventBus>,
    queue: Arc<RequestQueue>,
    stats: Arc<CrawlStats>,
    fetcher: Fetcher,
    state: tokio::sync::OnceCell<Arc<RwLock<S>>>,
    suspended: AtomicBool,
    handler: RequestHandler<S>,
}

impl<S> HttpCrawler<S>
where
    S: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
{
    /// Build a crawler wired to the actor's storage and event bus
    ///
    /// The request queue and statistics are restored from the key-value
    /// store, so a rebooted run resumes where the previous one stopped.
    pub async fn new(actor: &Actor, handler: RequestHandler<S>) -> Result<Self> {
        let config = actor.config_arc();
        let kv = actor.key_value_store();
        let queue = RequestQueue::restore(&kv).await?;
        let stats = CrawlStats::restore(&kv).await?;
        let fetcher = Fetcher::new(config.request_timeout())?;

        Ok(Self {
            config,
            kv,
            dataset: actor.dataset(),
            events: actor.events(),
            queue: Arc::new(queue),
            stats: Arc::new(stats),
            fetcher,
            state: tokio::sync::OnceCell::new(),
            suspended: AtomicBool::new(false),
            handler,
        })
    }

    /// The shared state blob, loading it from storage on first use
    pub async fn use_state(&self) -> Result<Arc<RwLock<S>>> {
        self.state
            .get_or_try_init(|| async {
                let loaded: Option<S> = self.kv.get_value(CRAWLER_STATE_KEY).await?;
                if loaded.is_some() {
                    info!("Restored crawler state blob");
                }
                Ok::<_, anyhow::Error>(Arc::new(RwLock::new(loaded.unwrap_or_default())))
            })
            .await
            .map(Arc::clone)
    }

    /// Write the current state blob to the key-value store
    pub async fn persist_state(&self) -> Result<()> {
        let state = self.use_state().await?;
        let value = serde_json::to_value(&*state.read())
            .context("Failed to serialize crawler state blob")?;
        self.kv.set_value(CRAWLER_STATE_KEY, &value).await
    }

    /// Persist the state blob, statistics and pending-work snapshot
    ///
    /// The three components are written concurrently to minimize the
    /// window in which they disagree.
    pub async fn persist_all(&self) -> Result<()> {
        tokio::try_join!(
            self.persist_state(),
            self.stats.persist(&self.kv),
            self.queue.persist(&self.kv),
        )?;
        Ok(())
    }

    /// Stop claiming new requests; in-flight handlers run to completion
    pub fn suspend(&self) {
        self.suspended.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stats(&self) -> &Arc<CrawlStats> {
        &self.stats
    }

    #[must_use]
    pub fn queue(&self) -> &Arc<RequestQueue> {
        &self.queue
    }

    #[must_use]
    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    fn page_limit_reached(&self) -> bool {
        self.config
            .page_limit()
            .is_some_and(|limit| self.stats.requests_finished() as usize >= limit)
    }

    /// Crawl from the given seed URLs until the queue drains
    ///
    /// Returns when all pending work is handled, the page limit is
    /// reached, or the crawler was suspended by a lifecycle event.
    pub async fn run<I, U>(self: &Arc<Self>, seeds: I) -> Result<()>
    where
        I: IntoIterator<Item = U>,
        U: Into<String>,
    {
        let state = self.use_state().await?;

        for seed in seeds {
            let request = QueuedRequest::new(seed, 0);
            if !self.queue.add_request(request).await {
                debug!("Seed already seen, skipping");
            }
        }

        let watcher = self.spawn_event_watcher();
        let max_concurrency = self.config.max_concurrency();
        let mut active: FuturesUnordered<JoinHandle<()>> = FuturesUnordered::new();

        loop {
            // Claim work up to the concurrency limit
            while !self.is_suspended()
                && !self.page_limit_reached()
                && active.len() < max_concurrency
            {
                let Some(request) = self.queue.fetch_next().await else {
                    break;
                };
                let crawler = Arc::clone(self);
                let state = Arc::clone(&state);
                active.push(tokio::spawn(async move {
                    crawler.process_request(state, request).await;
                }));
            }

            match active.next().await {
                Some(Ok(())) => {}
                Some(Err(e)) => error!("Crawl task panicked: {e}"),
                None => {
                    if self.is_suspended()
                        || self.page_limit_reached()
                        || self.queue.is_empty().await
                    {
                        break;
                    }
                }
            }
        }

        watcher.abort();

        if self.is_suspended() {
            info!(
                "Crawl suspended with {} requests still pending",
                self.queue.pending_count().await
            );
        } else {
            info!(
                "Crawl finished: {} succeeded, {} failed, {} retries",
                self.stats.requests_finished(),
                self.stats.requests_failed(),
                self.stats.retry_count()
            );
        }
        Ok(())
    }

    /// Watch the platform event bus for the lifetime of a run
    fn spawn_event_watcher(self: &Arc<Self>) -> JoinHandle<()> {
        let crawler = Arc::clone(self);
        let mut rx = self.events.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = crawler.events.wait_for_shutdown() => break,
                    received = rx.recv() => match received {
                        Ok(event @ (PlatformEvent::Migrating { .. } | PlatformEvent::Aborting { .. })) => {
                            info!(
                                "Received {} notification, no new requests will be started",
                                event.kind()
                            );
                            crawler.suspend();
                        }
                        Ok(PlatformEvent::PersistState { .. }) => {
                            if let Err(e) = crawler.persist_all().await {
                                warn!("Periodic state persistence failed: {e:#}");
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!("Event watcher lagged, missed {missed} events");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        })
    }

    async fn process_request(&self, state: Arc<RwLock<S>>, request: QueuedRequest) {
        match self.handle_request(&state, &request).await {
            Ok(loaded_url) => {
                // Handled only after the handler's effects are done
                self.queue.mark_handled();
                self.stats.record_finished();
                debug!("Completed {loaded_url}");
            }
            Err(e) => {
                let kind = FailureKind::classify(&e);
                if kind.is_retryable() && request.retry_count < self.config.max_request_retries() {
                    self.stats.record_retry();
                    warn!(
                        "Request {} failed ({kind:?}), will retry: {e:#}",
                        request.url
                    );
                    self.queue.reclaim(request.retried()).await;
                } else {
                    self.queue.mark_handled();
                    self.stats.record_failed();
                    error!("Request {} failed permanently: {e:#}", request.url);
                }
            }
        }
    }

    async fn handle_request(
        &self,
        state: &Arc<RwLock<S>>,
        request: &QueuedRequest,
    ) -> Result<String> {
        let page = self.fetcher.fetch(&request.url).await?;
        let base = Url::parse(&page.loaded_url)
            .with_context(|| format!("Unparseable loaded URL {}", page.loaded_url))?;
        let loaded_url = page.loaded_url.clone();

        let ctx = CrawlContext::new(
            request.clone(),
            page,
            base,
            self.config.max_depth(),
            Arc::clone(&self.queue),
            Arc::clone(&self.dataset),
            Arc::clone(state),
        );
        (self.handler)(ctx).await?;
        Ok(loaded_url)
    }
}
