//! Broadcast bus carrying platform lifecycle events
//!
//! All clones of the senders and every subscriber share one shutdown
//! signal; subscribers exit their loops when it fires.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Notify, broadcast};

use super::errors::EventBusError;
use super::types::PlatformEvent;

/// Event bus for publishing and subscribing to platform lifecycle events
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
    shutdown: Arc<Notify>,
    shutdown_flag: Arc<AtomicBool>,
    published: AtomicU64,
}

impl EventBus {
    /// Create a new event bus with the specified buffer capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            shutdown: Arc::new(Notify::new()),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            published: AtomicU64::new(0),
        }
    }

    /// Publish an event to all subscribers
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of active subscribers that received the event
    /// * `Err(EventBusError)` - Bus is shut down, or nobody is listening
    pub async fn publish(&self, event: PlatformEvent) -> Result<usize, EventBusError> {
        if self.is_shutdown() {
            return Err(EventBusError::Shutdown);
        }
        match self.sender.send(event) {
            Ok(subscriber_count) => {
                self.published.fetch_add(1, Ordering::Relaxed);
                Ok(subscriber_count)
            }
            Err(_) => Err(EventBusError::NoSubscribers),
        }
    }

    /// Subscribe to events
    ///
    /// # Returns
    /// A receiver that can be used to listen for events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Check if the event bus has any active subscribers
    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        self.subscriber_count() > 0
    }

    /// Total number of events published so far
    #[must_use]
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Signal shutdown to all subscribers
    ///
    /// This method is idempotent - calling it multiple times is safe.
    pub fn shutdown(&self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);
        self.shutdown.notify_waiters();
        log::debug!("Event bus shutdown signaled");
    }

    /// Wait for shutdown signal
    ///
    /// Subscribers should use this with `tokio::select!` to exit gracefully:
    ///
    /// ```rust,ignore
    /// tokio::select! {
    ///     event = rx.recv() => { /* handle event */ }
    ///     _ = bus.wait_for_shutdown() => { /* break */ }
    /// }
    /// ```
    pub async fn wait_for_shutdown(&self) {
        if self.is_shutdown() {
            return;
        }
        self.shutdown.notified().await;
    }

    /// Check if shutdown has been signaled
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_flag.load(Ordering::SeqCst)
    }
}
