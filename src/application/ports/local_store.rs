use crate::domain::value_objects::{EntityTable, RecordId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::Value;

/// Authoritative record store. Records are local-shape JSON keyed by table
/// and id. A failure here is fatal to the enclosing operation; there is no
/// fallback once the local store is unavailable.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, table: EntityTable, id: &RecordId) -> Result<Option<Value>, AppError>;
    async fn get_all(&self, table: EntityTable) -> Result<Vec<Value>, AppError>;
    async fn put(&self, table: EntityTable, id: &RecordId, data: &Value) -> Result<(), AppError>;
    async fn delete(&self, table: EntityTable, id: &RecordId) -> Result<(), AppError>;
}
