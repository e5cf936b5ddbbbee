//! Actor init/exit lifecycle
//!
//! `Actor::init` opens the default stores and starts the event sources;
//! `Actor::exit` shuts the bus down so every subscriber loop terminates.

use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::ActorConfig;
use crate::events::{EventBus, spawn_persist_ticker, spawn_signal_listener};
use crate::storage::{Dataset, KeyValueStore};
use crate::utils::{DEFAULT_STORE_NAME, EVENT_BUS_CAPACITY};

use super::client::PlatformClient;

/// A running actor: configuration, stores, event bus and platform client
pub struct Actor {
    config: Arc<ActorConfig>,
    events: Arc<EventBus>,
    kv: Arc<KeyValueStore>,
    dataset: Arc<Dataset>,
    client: PlatformClient,
    background: Vec<JoinHandle<()>>,
}

impl Actor {
    /// Initialize the actor: open stores, start event sources
    pub async fn init(config: ActorConfig) -> Result<Self> {
        let config = Arc::new(config);
        match config.actor_run_id() {
            Some(run_id) => tracing::info!("Actor initializing (run {run_id})"),
            None => tracing::info!("Actor initializing (local run)"),
        }

        let kv = Arc::new(KeyValueStore::open(config.storage_dir(), DEFAULT_STORE_NAME).await?);
        let dataset = Arc::new(Dataset::open(config.storage_dir(), DEFAULT_STORE_NAME).await?);
        let events = Arc::new(EventBus::new(EVENT_BUS_CAPACITY));
        let client = PlatformClient::new(&config)?;

        let background = vec![
            spawn_signal_listener(Arc::clone(&events)),
            spawn_persist_ticker(Arc::clone(&events), config.autosave_interval()),
        ];

        Ok(Self {
            config,
            events,
            kv,
            dataset,
            client,
            background,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ActorConfig {
        &self.config
    }

    #[must_use]
    pub fn config_arc(&self) -> Arc<ActorConfig> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    #[must_use]
    pub fn key_value_store(&self) -> Arc<KeyValueStore> {
        Arc::clone(&self.kv)
    }

    #[must_use]
    pub fn dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }

    #[must_use]
    pub fn client(&self) -> &PlatformClient {
        &self.client
    }

    /// Shut down event sources and log a final summary
    pub async fn exit(self) -> Result<()> {
        tracing::info!(
            "Actor exiting; {} dataset items stored, {} lifecycle events published",
            self.dataset.item_count(),
            self.events.published_count()
        );
        self.events.shutdown();
        for task in self.background {
            task.abort();
        }
        Ok(())
    }
}
