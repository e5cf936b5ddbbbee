//! Event sources feeding the bus
//!
//! On the platform, lifecycle notifications arrive over the hosting
//! infrastructure's push channel. Locally, termination signals stand in
//! for `aborting`, and an interval ticker produces the periodic
//! `PersistState` reminders.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::bus::EventBus;
use super::types::PlatformEvent;

/// Map OS termination signals to an `Aborting` event
///
/// SIGINT and SIGTERM both publish `Aborting`; the interruption handlers
/// take it from there. The task exits after the first signal.
pub fn spawn_signal_listener(bus: Arc<EventBus>) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = wait_for_termination_signal() => {
                log::info!("Termination signal received, publishing aborting event");
                if let Err(e) = bus.publish(PlatformEvent::aborting()).await {
                    log::debug!("Aborting event not delivered: {e}");
                }
            }
            () = bus.wait_for_shutdown() => {}
        }
    })
}

#[cfg(unix)]
async fn wait_for_termination_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let sigterm = signal(SignalKind::terminate());
    match sigterm {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            log::warn!("Failed to install SIGTERM handler, falling back to SIGINT only: {e}");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_termination_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Publish a `PersistState` event on a fixed interval
///
/// The ticker stops when the bus shuts down. A missed delivery (no
/// subscribers yet) is normal during startup and only logged at debug.
pub fn spawn_persist_ticker(bus: Arc<EventBus>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = tokio::time::sleep(interval) => {
                    if let Err(e) = bus.publish(PlatformEvent::persist_state(false)).await {
                        log::debug!("PersistState tick not delivered: {e}");
                    }
                }
                () = bus.wait_for_shutdown() => break,
            }
        }
    })
}
