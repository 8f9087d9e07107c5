//! End-to-end flows over the public API: offline write then reconnect, and
//! near-simultaneous duplicate saves.

use async_trait::async_trait;
use gymbook_sync::application::services::{
    ConnectivityMonitor, RecordService, SaveGuard, SyncService,
};
use gymbook_sync::infrastructure::database::{SqliteLocalStore, SqliteOperationQueue};
use gymbook_sync::shared::config::{SaveGuardConfig, SyncConfig};
use gymbook_sync::{EntityTable, RecordId, RemoteError, RemoteStore, SaveOutcome};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct RecordingRemote {
    upserts: Mutex<Vec<(String, String)>>,
    deletes: Mutex<Vec<(String, String)>>,
}

impl RecordingRemote {
    fn upserts(&self) -> Vec<(String, String)> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for RecordingRemote {
    async fn upsert(&self, table: EntityTable, row: Value) -> Result<Value, RemoteError> {
        let id = row["id"].as_str().unwrap_or_default().to_string();
        self.upserts.lock().unwrap().push((table.to_string(), id));
        Ok(row)
    }

    async fn delete_row(&self, table: EntityTable, id: &RecordId) -> Result<(), RemoteError> {
        self.deletes
            .lock()
            .unwrap()
            .push((table.to_string(), id.to_string()));
        Ok(())
    }

    async fn get_all(&self, _table: EntityTable) -> Result<Vec<Value>, RemoteError> {
        Ok(Vec::new())
    }

    async fn get_by_id(
        &self,
        _table: EntityTable,
        _id: &RecordId,
    ) -> Result<Option<Value>, RemoteError> {
        Ok(None)
    }

    async fn count(&self, _table: EntityTable) -> Result<u64, RemoteError> {
        Ok(0)
    }
}

struct Harness {
    records: Arc<RecordService>,
    sync: Arc<SyncService>,
    connectivity: Arc<ConnectivityMonitor>,
    remote: Arc<RecordingRemote>,
}

async fn harness(initially_online: bool) -> Harness {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let local = Arc::new(SqliteLocalStore::new(pool.clone()));
    let queue = Arc::new(SqliteOperationQueue::new(pool));
    let remote = Arc::new(RecordingRemote::default());
    let connectivity = Arc::new(ConnectivityMonitor::new(initially_online));
    let guard = Arc::new(SaveGuard::new(&SaveGuardConfig { debounce_ms: 60_000 }));

    let sync = Arc::new(SyncService::new(
        queue.clone(),
        remote.clone(),
        connectivity.clone(),
        SyncConfig {
            auto_sync: false,
            sync_interval: 30,
            max_retry: 5,
            synced_retention_secs: 3600,
        },
    ));

    let records = Arc::new(RecordService::new(
        local,
        queue,
        guard,
        connectivity.clone(),
        sync.clone(),
    ));

    Harness {
        records,
        sync,
        connectivity,
        remote,
    }
}

fn record_id(id: &str) -> RecordId {
    RecordId::new(id.to_string()).unwrap()
}

async fn wait_until_drained(sync: &SyncService) {
    for _ in 0..100 {
        if sync.status().await.unwrap().unsynced == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("queue never drained");
}

#[tokio::test]
async fn offline_write_syncs_on_reconnect() {
    let h = harness(false).await;

    h.records
        .save(
            EntityTable::Members,
            record_id("m1"),
            json!({"id": "m1", "name": "offline member"}),
        )
        .await
        .unwrap();

    let status = h.sync.status().await.unwrap();
    assert_eq!(status.unsynced, 1);
    assert!(h.remote.upserts().is_empty());

    let reconnect_task = h.sync.spawn_reconnect_drain();
    h.connectivity.set_online(true);
    wait_until_drained(&h.sync).await;

    let status = h.sync.status().await.unwrap();
    assert_eq!(status.unsynced, 0);
    assert_eq!(status.failed, 0);
    assert_eq!(
        h.remote.upserts(),
        vec![("members".to_string(), "m1".to_string())]
    );

    reconnect_task.abort();
}

#[tokio::test]
async fn concurrent_duplicate_saves_produce_one_write() {
    let h = harness(true).await;

    let payload = json!({"id": "m2", "name": "eager member"});
    let (first, second) = tokio::join!(
        h.records
            .save(EntityTable::Members, record_id("m2"), payload.clone()),
        h.records
            .save(EntityTable::Members, record_id("m2"), payload.clone()),
    );

    let outcomes = [first.unwrap(), second.unwrap()];
    let saved = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, SaveOutcome::Saved(_)))
        .count();
    let dropped = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, SaveOutcome::Deduplicated))
        .count();
    assert_eq!(saved, 1);
    assert_eq!(dropped, 1);

    wait_until_drained(&h.sync).await;
    assert_eq!(
        h.remote.upserts(),
        vec![("members".to_string(), "m2".to_string())]
    );
}

#[tokio::test]
async fn clear_queue_is_an_explicit_escape_hatch() {
    let h = harness(false).await;

    h.records
        .save(EntityTable::Products, record_id("p1"), json!({"id": "p1"}))
        .await
        .unwrap();
    h.records
        .save(EntityTable::Courses, record_id("c1"), json!({"id": "c1"}))
        .await
        .unwrap();
    assert_eq!(h.sync.status().await.unwrap().unsynced, 2);

    let removed = h.sync.clear_queue().await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(h.sync.status().await.unwrap().unsynced, 0);

    // Nothing reaches the remote afterwards, the queue really is gone
    h.connectivity.set_online(true);
    h.sync.force_sync_now().await.unwrap();
    assert!(h.remote.upserts().is_empty());
}
