//! Shared configuration constants for crawl-actor
//!
//! This module contains default values and reserved storage keys used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Grace delay before persisting state on a migration/abort notification: 10 seconds
///
/// The delay serves two purposes:
/// 1. It lands our write after the periodic autosave tick instead of racing it
/// 2. It allows requests already in flight to finish; the crawler stops
///    claiming new ones as soon as the event is observed
///
/// Tests override this via `persist_delay_ms` to keep runs fast.
pub const DEFAULT_PERSIST_DELAY_MS: u64 = 10_000;

/// Periodic state autosave interval: 60 seconds
///
/// Every tick publishes a `PersistState` event; the crawler responds by
/// writing its state blob, statistics, and pending-work snapshot.
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 60_000;

/// Default maximum crawl depth: 3 levels
///
/// Limits how deep the crawler will follow links from the seed URL.
pub const DEFAULT_MAX_DEPTH: u8 = 3;

/// Default number of requests processed concurrently
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Default retry limit for transient request failures
pub const DEFAULT_MAX_REQUEST_RETRIES: u8 = 3;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Event bus buffer capacity
///
/// Lifecycle events are rare; a small buffer is plenty, and a lagged
/// subscriber only ever misses autosave ticks.
pub const EVENT_BUS_CAPACITY: usize = 64;

/// User agent sent with every page request
pub const USER_AGENT: &str = "crawl-actor/0.1 (+https://crates.io/crates/crawl-actor)";

/// Name of the default key-value store and dataset
pub const DEFAULT_STORE_NAME: &str = "default";

/// Reserved key for the crawler's custom state blob
pub const CRAWLER_STATE_KEY: &str = "CRAWLER_STATE";

/// Reserved key for crawl statistics snapshots
pub const CRAWLER_STATISTICS_KEY: &str = "CRAWLER_STATISTICS";

/// Reserved key for the pending-work snapshot
pub const REQUEST_QUEUE_STATE_KEY: &str = "REQUEST_QUEUE_STATE";
