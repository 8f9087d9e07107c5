use crate::application::ports::LocalStore;
use crate::domain::value_objects::{EntityTable, RecordId};
use crate::infrastructure::database::connection::DbPool;
use crate::infrastructure::database::rows::LocalRecordRow;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

pub struct SqliteLocalStore {
    pool: DbPool,
}

impl SqliteLocalStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn parse_data(row: LocalRecordRow) -> Result<Value, AppError> {
        serde_json::from_str(&row.data)
            .map_err(|err| AppError::DeserializationError(err.to_string()))
    }
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    async fn get(&self, table: EntityTable, id: &RecordId) -> Result<Option<Value>, AppError> {
        let row = sqlx::query_as::<_, LocalRecordRow>(
            "SELECT * FROM local_records WHERE table_name = ?1 AND record_id = ?2",
        )
        .bind(table.as_str())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::parse_data).transpose()
    }

    async fn get_all(&self, table: EntityTable) -> Result<Vec<Value>, AppError> {
        let rows = sqlx::query_as::<_, LocalRecordRow>(
            "SELECT * FROM local_records WHERE table_name = ?1 ORDER BY created_at ASC, record_id ASC",
        )
        .bind(table.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::parse_data).collect()
    }

    async fn put(&self, table: EntityTable, id: &RecordId, data: &Value) -> Result<(), AppError> {
        let serialized = serde_json::to_string(data)
            .map_err(|err| AppError::SerializationError(err.to_string()))?;
        let now = Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO local_records (table_name, record_id, data, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(table_name, record_id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(table.as_str())
        .bind(id.as_str())
        .bind(&serialized)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, table: EntityTable, id: &RecordId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM local_records WHERE table_name = ?1 AND record_id = ?2")
            .bind(table.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
