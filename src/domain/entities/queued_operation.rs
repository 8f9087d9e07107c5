use crate::domain::value_objects::{
    EntityTable, OperationId, OperationKind, OperationPayload, QueueStatus, RecordId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One pending mutation awaiting confirmation from the remote store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedOperation {
    pub row_id: Option<i64>,
    pub operation_id: OperationId,
    pub table: EntityTable,
    pub record_id: RecordId,
    pub kind: OperationKind,
    pub payload: OperationPayload,
    pub status: QueueStatus,
    pub retry_count: u32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced_at: Option<DateTime<Utc>>,
}

impl QueuedOperation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        row_id: Option<i64>,
        operation_id: OperationId,
        table: EntityTable,
        record_id: RecordId,
        kind: OperationKind,
        payload: OperationPayload,
        status: QueueStatus,
        retry_count: u32,
        error_message: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        synced_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            row_id,
            operation_id,
            table,
            record_id,
            kind,
            payload,
            status,
            retry_count,
            error_message,
            created_at,
            updated_at,
            synced_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == QueueStatus::Pending
    }
}

/// Input for enqueueing a new operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationDraft {
    pub table: EntityTable,
    pub record_id: RecordId,
    pub kind: OperationKind,
    pub payload: OperationPayload,
}

impl OperationDraft {
    pub fn new(
        table: EntityTable,
        record_id: RecordId,
        kind: OperationKind,
        payload: OperationPayload,
    ) -> Self {
        Self {
            table,
            record_id,
            kind,
            payload,
        }
    }
}
