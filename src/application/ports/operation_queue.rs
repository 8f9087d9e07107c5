use crate::domain::entities::{OperationDraft, QueuedOperation};
use crate::domain::value_objects::{OperationId, QueueStatus};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::time::Duration;

/// Durable queue of mutations pending confirmation against the remote store.
/// Survives restarts; enqueue failures are unrecoverable.
#[async_trait]
pub trait OperationQueueStore: Send + Sync {
    /// Appends a pending operation. Never fails for business reasons; a
    /// storage error here means the mutation could be lost and propagates.
    async fn enqueue(&self, draft: OperationDraft) -> Result<QueuedOperation, AppError>;

    /// All pending operations, FIFO by creation time (rowid as tiebreak).
    /// Terminal failures are excluded.
    async fn list_pending(&self) -> Result<Vec<QueuedOperation>, AppError>;

    /// Terminal failures awaiting manual intervention.
    async fn list_failed(&self) -> Result<Vec<QueuedOperation>, AppError>;

    /// Idempotent: marking an already-synced operation is a no-op.
    async fn mark_synced(&self, operation_id: &OperationId) -> Result<(), AppError>;

    /// Increments the retry count and records the error. Past `max_retries`
    /// the operation transitions to the terminal failed state and returns it.
    async fn mark_failed(
        &self,
        operation_id: &OperationId,
        error_message: &str,
        max_retries: u32,
    ) -> Result<QueueStatus, AppError>;

    async fn count_pending(&self) -> Result<u64, AppError>;
    async fn count_failed(&self) -> Result<u64, AppError>;

    /// Removes every entry regardless of state. Manual recovery only.
    async fn clear(&self) -> Result<u64, AppError>;

    /// Removes terminal failures only.
    async fn clear_failed(&self) -> Result<u64, AppError>;

    /// Deletes synced entries older than the audit retention window.
    async fn prune_synced(&self, retention: Duration) -> Result<u64, AppError>;
}
