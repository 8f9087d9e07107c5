//! Offline-first synchronization core for the Gymbook admin app.
//!
//! The local SQLite store is the authoritative copy of every entity; the
//! hosted backend is an eventually-consistent mirror. Every mutation is
//! written locally, queued durably, and drained against the remote store by
//! the sync service with bounded retries. UI layers consume the services
//! exposed here instead of reimplementing queue draining per screen.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{LocalStore, OperationQueueStore, RemoteError, RemoteStore};
pub use application::services::{
    ConnectivityMonitor, QueueMaintenanceJob, QueueMaintenanceReport, RecordService, SaveGuard,
    SaveGuardStatus, SaveOutcome, SyncService,
};
pub use domain::entities::{DrainReport, DrainTrigger, QueuedOperation, SyncStatusSnapshot};
pub use domain::value_objects::{EntityTable, OperationKind, RecordId};
pub use shared::{AppConfig, AppError};
pub use state::AppState;

/// Logging bootstrap for hosts that do not bring their own subscriber.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gymbook_sync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
