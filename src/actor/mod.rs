//! Actor Lifecycle Module
//!
//! This module contains the platform surface of the actor: init/exit,
//! the platform API client, and the interruption handlers that persist
//! crawl state when the run is about to be migrated or aborted.

pub mod client;
pub mod lifecycle;
pub mod migration;

pub use client::PlatformClient;
pub use lifecycle::Actor;
pub use migration::{ExitFn, setup_migrate_abort_handlers, spawn_interruption_listener};
