use crate::domain::entities::QueuedOperation;
use crate::domain::value_objects::{
    EntityTable, OperationId, OperationKind, OperationPayload, QueueStatus, RecordId,
};
use crate::infrastructure::database::rows::OperationRow;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};

pub fn queued_operation_from_row(row: OperationRow) -> Result<QueuedOperation, AppError> {
    let operation_id =
        OperationId::parse(&row.operation_id).map_err(AppError::ValidationError)?;
    let table: EntityTable = row
        .table_name
        .parse()
        .map_err(AppError::ValidationError)?;
    let record_id = RecordId::new(row.record_id).map_err(AppError::ValidationError)?;
    let kind: OperationKind = row.kind.parse().map_err(AppError::ValidationError)?;
    let payload_value: serde_json::Value = serde_json::from_str(&row.payload)
        .map_err(|err| AppError::DeserializationError(err.to_string()))?;
    let payload = OperationPayload::new(payload_value).map_err(AppError::ValidationError)?;
    let status = QueueStatus::from(row.status.as_str());
    let retry_count = u32::try_from(row.retry_count).unwrap_or(0);

    Ok(QueuedOperation::new(
        Some(row.id),
        operation_id,
        table,
        record_id,
        kind,
        payload,
        status,
        retry_count,
        row.error_message,
        timestamp_to_datetime(row.created_at),
        timestamp_to_datetime(row.updated_at),
        row.synced_at.map(timestamp_to_datetime),
    ))
}

pub fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .or_else(|| DateTime::<Utc>::from_timestamp_millis(ts))
        .unwrap_or_else(Utc::now)
}
