use crate::application::ports::{LocalStore, OperationQueueStore};
use crate::application::services::connectivity::ConnectivityMonitor;
use crate::application::services::save_guard::SaveGuard;
use crate::application::services::sync_service::SyncService;
use crate::domain::entities::{DrainTrigger, OperationDraft, QueuedOperation};
use crate::domain::value_objects::{EntityTable, OperationKind, OperationPayload, RecordId};
use crate::shared::error::AppError;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Outcome of a mutation request. `Deduplicated` means the save guard
/// dropped the request because an equivalent save was already in flight or
/// had just completed; the caller's intent is satisfied either way.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(QueuedOperation),
    Deduplicated,
}

/// Entry point for every entity mutation: local write first (authoritative,
/// always), speculative enqueue second, opportunistic flush last. The local
/// write and the enqueue happen regardless of connectivity so a connection
/// lost mid-write is always recoverable from the queue.
pub struct RecordService {
    local: Arc<dyn LocalStore>,
    queue: Arc<dyn OperationQueueStore>,
    guard: Arc<SaveGuard>,
    connectivity: Arc<ConnectivityMonitor>,
    sync: Arc<SyncService>,
}

impl RecordService {
    pub fn new(
        local: Arc<dyn LocalStore>,
        queue: Arc<dyn OperationQueueStore>,
        guard: Arc<SaveGuard>,
        connectivity: Arc<ConnectivityMonitor>,
        sync: Arc<SyncService>,
    ) -> Self {
        Self {
            local,
            queue,
            guard,
            connectivity,
            sync,
        }
    }

    pub async fn save(
        &self,
        table: EntityTable,
        id: RecordId,
        record: Value,
    ) -> Result<SaveOutcome, AppError> {
        if !self.guard.begin_save(table, &id).await {
            return Ok(SaveOutcome::Deduplicated);
        }

        // end_save must run on the error path too, or the guard would block
        // this record for good.
        let result = self.save_inner(table, &id, record).await;
        self.guard.end_save(table, &id).await;
        result
    }

    async fn save_inner(
        &self,
        table: EntityTable,
        id: &RecordId,
        record: Value,
    ) -> Result<SaveOutcome, AppError> {
        let payload = OperationPayload::new(record.clone()).map_err(AppError::ValidationError)?;

        let kind = if self.local.get(table, id).await?.is_some() {
            OperationKind::Update
        } else {
            OperationKind::Create
        };

        self.local.put(table, id, &record).await?;

        let operation = self
            .queue
            .enqueue(OperationDraft::new(table, id.clone(), kind, payload))
            .await?;

        debug!(
            target: "sync::records",
            table = %table,
            record = %id,
            kind = %kind,
            "mutation stored locally and queued"
        );

        self.flush_if_online();

        Ok(SaveOutcome::Saved(operation))
    }

    pub async fn delete(&self, table: EntityTable, id: RecordId) -> Result<SaveOutcome, AppError> {
        if !self.guard.begin_save(table, &id).await {
            return Ok(SaveOutcome::Deduplicated);
        }

        let result = self.delete_inner(table, &id).await;
        self.guard.end_save(table, &id).await;
        result
    }

    async fn delete_inner(
        &self,
        table: EntityTable,
        id: &RecordId,
    ) -> Result<SaveOutcome, AppError> {
        let payload = OperationPayload::new(serde_json::json!({ "id": id.as_str() }))
            .map_err(AppError::ValidationError)?;

        self.local.delete(table, id).await?;

        let operation = self
            .queue
            .enqueue(OperationDraft::new(
                table,
                id.clone(),
                OperationKind::Delete,
                payload,
            ))
            .await?;

        self.flush_if_online();

        Ok(SaveOutcome::Saved(operation))
    }

    pub async fn get(&self, table: EntityTable, id: &RecordId) -> Result<Option<Value>, AppError> {
        self.local.get(table, id).await
    }

    pub async fn list(&self, table: EntityTable) -> Result<Vec<Value>, AppError> {
        self.local.get_all(table).await
    }

    fn flush_if_online(&self) {
        if self.connectivity.is_online() {
            self.sync.request_drain(DrainTrigger::Manual);
        }
    }
}
