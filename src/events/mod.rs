//! Platform Lifecycle Event Module
//!
//! The hosting platform notifies a running actor of imminent interruption
//! ("migrating", "aborting") and of periodic persistence ticks. This module
//! carries those notifications to subscribers over a broadcast bus.

pub mod bus;
pub mod errors;
pub mod sources;
pub mod types;

pub use bus::EventBus;
pub use errors::EventBusError;
pub use sources::{spawn_persist_ticker, spawn_signal_listener};
pub use types::PlatformEvent;
