use crate::application::ports::{LocalStore, OperationQueueStore, RemoteStore};
use crate::application::services::{
    ConnectivityMonitor, QueueMaintenanceJob, RecordService, SaveGuard, SyncService,
};
use crate::infrastructure::database::{Database, DbPool, SqliteLocalStore, SqliteOperationQueue};
use crate::infrastructure::remote::RestRemoteStore;
use crate::shared::config::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Explicitly constructed service graph. Everything is built once here and
/// handed out by reference; there are no module-level singletons, so two
/// states never share guard, queue, or drain state.
pub struct AppState {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub guard: Arc<SaveGuard>,
    pub sync: Arc<SyncService>,
    pub records: Arc<RecordService>,
    pub maintenance: Arc<QueueMaintenanceJob>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate().map_err(anyhow::Error::msg)?;

        let db_pool =
            Database::initialize_with(&config.database.url, config.database.max_connections)
                .await?;

        let local: Arc<dyn LocalStore> = Arc::new(SqliteLocalStore::new(db_pool.clone()));
        let queue: Arc<dyn OperationQueueStore> =
            Arc::new(SqliteOperationQueue::new(db_pool.clone()));
        let remote: Arc<dyn RemoteStore> = Arc::new(RestRemoteStore::new(&config.remote)?);

        // Start offline; the host flips the monitor once it has evidence of
        // connectivity, which also kicks the first reconnect drain.
        let connectivity = Arc::new(ConnectivityMonitor::new(false));
        let guard = Arc::new(SaveGuard::new(&config.guard));

        let sync = Arc::new(SyncService::new(
            queue.clone(),
            remote,
            connectivity.clone(),
            config.sync.clone(),
        ));

        let records = Arc::new(RecordService::new(
            local,
            queue.clone(),
            guard.clone(),
            connectivity.clone(),
            sync.clone(),
        ));

        let maintenance = QueueMaintenanceJob::new(
            queue,
            Duration::from_secs(config.sync.synced_retention_secs),
        );

        Ok(Self {
            config,
            db_pool,
            connectivity,
            guard,
            sync,
            records,
            maintenance,
        })
    }

    /// Spawns the long-lived sync loops and runs a first maintenance pass.
    /// Handles are returned so a host can abort them on shutdown.
    pub fn start_background_tasks(&self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();

        if self.config.sync.auto_sync {
            handles.push(self.sync.spawn_interval_drain());
        }
        handles.push(self.sync.spawn_reconnect_drain());

        self.maintenance.trigger();

        handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn state_wires_the_full_service_graph() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("state.db");

        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}?mode=rwc", db_path.display());

        let state = AppState::new(config).await.unwrap();

        assert!(!state.connectivity.is_online());
        let status = state.sync.status().await.unwrap();
        assert_eq!(status.unsynced, 0);
        assert!(!status.in_progress);

        state.db_pool.close().await;
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.sync.sync_interval = 0;

        assert!(AppState::new(config).await.is_err());
    }
}
