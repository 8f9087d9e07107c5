use crate::domain::value_objects::{EntityTable, RecordId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("backend rejected request ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether retrying the same call can plausibly succeed. Used for log
    /// levels and metrics; both kinds go through the queue's bounded retry
    /// accounting.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport(_) | RemoteError::Timeout => true,
            RemoteError::Backend { status, .. } => *status >= 500,
            RemoteError::Decode(_) => false,
        }
    }
}

impl From<RemoteError> for AppError {
    fn from(err: RemoteError) -> Self {
        AppError::Remote(err.to_string())
    }
}

/// Row-based access to the hosted backend. Records cross this boundary in
/// the local shape; the implementation owns the translation to and from the
/// backend's wire convention, keeping the rest of the system isolated from
/// the backend's API shape.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn upsert(&self, table: EntityTable, row: Value) -> Result<Value, RemoteError>;
    async fn delete_row(&self, table: EntityTable, id: &RecordId) -> Result<(), RemoteError>;
    async fn get_all(&self, table: EntityTable) -> Result<Vec<Value>, RemoteError>;
    async fn get_by_id(
        &self,
        table: EntityTable,
        id: &RecordId,
    ) -> Result<Option<Value>, RemoteError>;
    async fn count(&self, table: EntityTable) -> Result<u64, RemoteError>;
}
