pub mod actor;
pub mod config;
pub mod crawl;
pub mod events;
pub mod storage;
pub mod utils;

pub use actor::{Actor, ExitFn, PlatformClient, setup_migrate_abort_handlers};
pub use config::{ActorConfig, ActorConfigBuilder};
pub use crawl::{
    CrawlContext, CrawlStats, CrawlStatsState, FailureKind, HttpCrawler, QueuedRequest,
    RequestHandler, RequestQueue, RequestQueueState,
};
pub use events::{EventBus, EventBusError, PlatformEvent};
pub use storage::{Dataset, KeyValueStore};

// Test-accessible modules
pub use actor::migration::spawn_interruption_listener;
pub use crawl::link_extractor;
