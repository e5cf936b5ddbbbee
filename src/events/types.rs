//! Event type definitions for the platform lifecycle system

use serde::{Deserialize, Serialize};

/// Notifications delivered to a running actor
///
/// `Migrating` and `Aborting` are raised by external infrastructure and can
/// arrive between any two steps of the per-page handler; `PersistState` is
/// the periodic autosave tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlatformEvent {
    /// The platform will relocate this run to a different machine and reboot it
    Migrating {
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// The run is being forcibly stopped
    Aborting {
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Periodic reminder to persist mutable state
    PersistState {
        /// True when the tick was triggered by an imminent migration
        is_migrating: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlatformEvent {
    /// Create a `Migrating` event stamped now
    #[must_use]
    pub fn migrating() -> Self {
        Self::Migrating {
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create an `Aborting` event stamped now
    #[must_use]
    pub fn aborting() -> Self {
        Self::Aborting {
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a `PersistState` event stamped now
    #[must_use]
    pub fn persist_state(is_migrating: bool) -> Self {
        Self::PersistState {
            is_migrating,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Short name for log lines
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Migrating { .. } => "migrating",
            Self::Aborting { .. } => "aborting",
            Self::PersistState { .. } => "persistState",
        }
    }
}
