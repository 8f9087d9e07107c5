use crate::application::ports::OperationQueueStore;
use crate::domain::entities::{OperationDraft, QueuedOperation};
use crate::domain::value_objects::{OperationId, QueueStatus};
use crate::infrastructure::database::connection::DbPool;
use crate::infrastructure::database::mappers::queued_operation_from_row;
use crate::infrastructure::database::rows::OperationRow;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::time::Duration;

pub struct SqliteOperationQueue {
    pool: DbPool,
}

impl SqliteOperationQueue {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn count_by_status(&self, status: &str) -> Result<u64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM operation_queue WHERE status = ?1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count").unwrap_or(0);
        Ok(count.max(0) as u64)
    }

    async fn list_by_status(
        &self,
        status: &str,
        order: &str,
    ) -> Result<Vec<QueuedOperation>, AppError> {
        let query = format!(
            "SELECT * FROM operation_queue WHERE status = ?1 ORDER BY {order}"
        );
        let rows = sqlx::query_as::<_, OperationRow>(&query)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(queued_operation_from_row).collect()
    }
}

#[async_trait]
impl OperationQueueStore for SqliteOperationQueue {
    async fn enqueue(&self, draft: OperationDraft) -> Result<QueuedOperation, AppError> {
        let operation_id = OperationId::generate();
        let payload = serde_json::to_string(draft.payload.as_json())
            .map_err(|err| AppError::SerializationError(err.to_string()))?;
        let now = Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO operation_queue (
                operation_id, table_name, record_id, kind, payload,
                status, retry_count, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 'pending', 0, ?6, ?6)
            "#,
        )
        .bind(operation_id.as_str())
        .bind(draft.table.as_str())
        .bind(draft.record_id.as_str())
        .bind(draft.kind.as_str())
        .bind(&payload)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, OperationRow>(
            "SELECT * FROM operation_queue WHERE operation_id = ?1",
        )
        .bind(operation_id.as_str())
        .fetch_one(&self.pool)
        .await?;

        queued_operation_from_row(row)
    }

    async fn list_pending(&self) -> Result<Vec<QueuedOperation>, AppError> {
        self.list_by_status("pending", "created_at ASC, id ASC")
            .await
    }

    async fn list_failed(&self) -> Result<Vec<QueuedOperation>, AppError> {
        self.list_by_status("failed", "updated_at DESC, id DESC")
            .await
    }

    async fn mark_synced(&self, operation_id: &OperationId) -> Result<(), AppError> {
        let now = Utc::now().timestamp();

        sqlx::query(
            r#"
            UPDATE operation_queue
            SET status = 'synced', synced_at = ?1, updated_at = ?1, error_message = NULL
            WHERE operation_id = ?2 AND status != 'synced'
            "#,
        )
        .bind(now)
        .bind(operation_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_failed(
        &self,
        operation_id: &OperationId,
        error_message: &str,
        max_retries: u32,
    ) -> Result<QueueStatus, AppError> {
        // Read-modify-write inside one transaction so the terminal-state
        // decision is based on the row as it is now, not a stale snapshot.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT retry_count, status FROM operation_queue WHERE operation_id = ?1",
        )
        .bind(operation_id.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let row = match row {
            Some(row) => row,
            None => {
                return Err(AppError::NotFound(format!(
                    "queued operation {operation_id} does not exist"
                )));
            }
        };

        let status = QueueStatus::from(row.try_get::<String, _>("status")?.as_str());
        if status == QueueStatus::Synced {
            // Already confirmed; a late failure report changes nothing.
            tx.commit().await?;
            return Ok(QueueStatus::Synced);
        }

        let retry_count: i32 = row.try_get("retry_count")?;
        let new_retry_count = retry_count.saturating_add(1);
        let new_status = if new_retry_count > max_retries as i32 {
            QueueStatus::Failed
        } else {
            QueueStatus::Pending
        };
        let now = Utc::now().timestamp();

        sqlx::query(
            r#"
            UPDATE operation_queue
            SET retry_count = ?1, status = ?2, error_message = ?3, updated_at = ?4
            WHERE operation_id = ?5
            "#,
        )
        .bind(new_retry_count)
        .bind(new_status.as_str())
        .bind(error_message)
        .bind(now)
        .bind(operation_id.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(new_status)
    }

    async fn count_pending(&self) -> Result<u64, AppError> {
        self.count_by_status("pending").await
    }

    async fn count_failed(&self) -> Result<u64, AppError> {
        self.count_by_status("failed").await
    }

    async fn clear(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM operation_queue")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn clear_failed(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM operation_queue WHERE status = 'failed'")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn prune_synced(&self, retention: Duration) -> Result<u64, AppError> {
        let cutoff = Utc::now().timestamp() - retention.as_secs() as i64;

        let result = sqlx::query(
            "DELETE FROM operation_queue WHERE status = 'synced' AND synced_at < ?1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{EntityTable, OperationKind, OperationPayload, RecordId};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_queue() -> SqliteOperationQueue {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        SqliteOperationQueue::new(pool)
    }

    fn draft(record_id: &str, kind: OperationKind) -> OperationDraft {
        OperationDraft::new(
            EntityTable::Members,
            RecordId::new(record_id.to_string()).unwrap(),
            kind,
            OperationPayload::from_json_str(&format!("{{\"id\": \"{record_id}\"}}")).unwrap(),
        )
    }

    #[tokio::test]
    async fn enqueue_returns_pending_operation() {
        let queue = setup_queue().await;

        let op = queue.enqueue(draft("m1", OperationKind::Create)).await.unwrap();

        assert!(op.is_pending());
        assert_eq!(op.retry_count, 0);
        assert_eq!(op.record_id.as_str(), "m1");
        assert_eq!(queue.count_pending().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn list_pending_is_fifo() {
        let queue = setup_queue().await;

        let first = queue.enqueue(draft("m1", OperationKind::Create)).await.unwrap();
        let second = queue.enqueue(draft("m1", OperationKind::Update)).await.unwrap();
        let third = queue.enqueue(draft("m2", OperationKind::Create)).await.unwrap();

        let pending = queue.list_pending().await.unwrap();
        let ids: Vec<_> = pending.iter().map(|op| op.operation_id.clone()).collect();
        assert_eq!(
            ids,
            vec![first.operation_id, second.operation_id, third.operation_id]
        );
    }

    #[tokio::test]
    async fn mark_synced_is_idempotent() {
        let queue = setup_queue().await;

        let op = queue.enqueue(draft("m1", OperationKind::Create)).await.unwrap();

        queue.mark_synced(&op.operation_id).await.unwrap();
        queue.mark_synced(&op.operation_id).await.unwrap();

        assert_eq!(queue.count_pending().await.unwrap(), 0);
        assert_eq!(queue.count_failed().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mark_failed_past_max_is_terminal() {
        let queue = setup_queue().await;
        let max_retries = 2;

        let op = queue.enqueue(draft("m1", OperationKind::Create)).await.unwrap();

        for _ in 0..max_retries {
            let status = queue
                .mark_failed(&op.operation_id, "connection refused", max_retries)
                .await
                .unwrap();
            assert_eq!(status, QueueStatus::Pending);
        }

        let status = queue
            .mark_failed(&op.operation_id, "connection refused", max_retries)
            .await
            .unwrap();
        assert_eq!(status, QueueStatus::Failed);

        // Terminal failures leave the automatic drain set
        assert!(queue.list_pending().await.unwrap().is_empty());
        let failed = queue.list_failed().await.unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(
            failed[0].error_message.as_deref(),
            Some("connection refused")
        );
    }

    #[tokio::test]
    async fn mark_failed_after_synced_is_noop() {
        let queue = setup_queue().await;

        let op = queue.enqueue(draft("m1", OperationKind::Create)).await.unwrap();
        queue.mark_synced(&op.operation_id).await.unwrap();

        let status = queue
            .mark_failed(&op.operation_id, "late failure", 5)
            .await
            .unwrap();
        assert_eq!(status, QueueStatus::Synced);
        assert_eq!(queue.count_failed().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mark_failed_unknown_operation_errors() {
        let queue = setup_queue().await;
        let missing = OperationId::generate();

        let result = queue.mark_failed(&missing, "whatever", 5).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn clear_failed_leaves_pending() {
        let queue = setup_queue().await;

        let doomed = queue.enqueue(draft("m1", OperationKind::Create)).await.unwrap();
        queue.enqueue(draft("m2", OperationKind::Create)).await.unwrap();

        queue.mark_failed(&doomed.operation_id, "boom", 0).await.unwrap();
        assert_eq!(queue.count_failed().await.unwrap(), 1);

        let removed = queue.clear_failed().await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(queue.count_failed().await.unwrap(), 0);
        assert_eq!(queue.count_pending().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn prune_synced_respects_retention() {
        let queue = setup_queue().await;

        let op = queue.enqueue(draft("m1", OperationKind::Create)).await.unwrap();
        queue.mark_synced(&op.operation_id).await.unwrap();

        // Fresh entries survive a generous retention window
        let removed = queue.prune_synced(Duration::from_secs(3600)).await.unwrap();
        assert_eq!(removed, 0);

        // Zero retention prunes anything synced before "now"; backdate the
        // entry a second to avoid same-second flakiness.
        sqlx::query("UPDATE operation_queue SET synced_at = synced_at - 2")
            .execute(&queue.pool)
            .await
            .unwrap();
        let removed = queue.prune_synced(Duration::from_secs(0)).await.unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let queue = setup_queue().await;

        queue.enqueue(draft("m1", OperationKind::Create)).await.unwrap();
        queue.enqueue(draft("m2", OperationKind::Delete)).await.unwrap();

        let removed = queue.clear().await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(queue.count_pending().await.unwrap(), 0);
    }
}
