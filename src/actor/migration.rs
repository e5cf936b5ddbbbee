//! Interruption handlers for migration and abort notifications
//!
//! State mismatch happens when the persisted components get out of sync.
//! The components here are: pushing a record to the dataset, bumping the
//! in-memory counter blob, and marking the source request handled. There
//! is no bulletproof way to prevent a mismatch, as the platform API itself
//! can be slow or unresponsive, so these handlers minimize the latency
//! between the state updates instead: wait out a fixed grace delay, then
//! persist every stateful component concurrently, then reboot or exit.

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::ActorConfig;
use crate::crawl::HttpCrawler;
use crate::events::{EventBus, PlatformEvent};

use super::client::PlatformClient;
use super::lifecycle::Actor;

/// Terminal action taken after an abort has been persisted
pub type ExitFn = Box<dyn Fn() + Send + Sync>;

/// Install the migrate/abort handlers for a crawler
///
/// On `Migrating`: persist all crawl state, then request a managed reboot
/// of this run. On `Aborting`: persist, then exit the process.
pub fn setup_migrate_abort_handlers<S>(actor: &Actor, crawler: Arc<HttpCrawler<S>>) -> JoinHandle<()>
where
    S: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
{
    spawn_interruption_listener(
        actor.events(),
        crawler,
        actor.client().clone(),
        actor.config_arc(),
        Box::new(|| std::process::exit(0)),
    )
}

/// Listener loop behind `setup_migrate_abort_handlers`
///
/// Exposed separately so the terminal action can be replaced; the
/// abort path would otherwise end the test process.
pub fn spawn_interruption_listener<S>(
    events: Arc<EventBus>,
    crawler: Arc<HttpCrawler<S>>,
    client: PlatformClient,
    config: Arc<ActorConfig>,
    on_abort: ExitFn,
) -> JoinHandle<()>
where
    S: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
{
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = events.wait_for_shutdown() => break,
                received = rx.recv() => match received {
                    Ok(PlatformEvent::Migrating { .. }) => {
                        info!("Migration imminent, persisting crawl state");
                        match persist_after_grace(&crawler, config.persist_delay()).await {
                            Ok(()) if client.is_at_home() => {
                                // Reboot usually takes under 100ms between the call
                                // and process teardown; the remaining mismatch
                                // window is small
                                if let Err(e) = client.reboot().await {
                                    error!("Reboot request failed: {e:#}");
                                }
                            }
                            Ok(()) => {
                                info!("Local run, nothing to reboot");
                            }
                            Err(e) => {
                                error!("State persistence before reboot failed: {e:#}");
                            }
                        }
                        break;
                    }
                    Ok(PlatformEvent::Aborting { .. }) => {
                        info!("Abort imminent, persisting crawl state");
                        if let Err(e) = persist_after_grace(&crawler, config.persist_delay()).await {
                            error!("State persistence before shutdown failed: {e:#}");
                        }
                        // Shut down immediately once state is persisted
                        on_abort();
                        break;
                    }
                    Ok(PlatformEvent::PersistState { .. }) => {}
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("Interruption listener lagged, missed {missed} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    })
}

/// Wait out the grace delay, then persist every stateful component
///
/// The delay is unconditional. It gives requests already in flight time to
/// finish (the crawler stops claiming new ones as soon as the event is
/// observed) and lands this write after the periodic autosave instead of
/// racing it. The three persists then run concurrently so the total
/// latency before process termination stays minimal.
async fn persist_after_grace<S>(crawler: &HttpCrawler<S>, delay: Duration) -> Result<()>
where
    S: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
{
    tokio::time::sleep(delay).await;
    crawler.persist_all().await
}
