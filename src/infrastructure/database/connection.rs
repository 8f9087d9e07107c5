use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;
use tracing::info;

pub type DbPool = Pool<Sqlite>;

pub struct Database;

impl Database {
    pub async fn initialize(database_url: &str) -> Result<DbPool> {
        Self::initialize_with(database_url, 5).await
    }

    pub async fn initialize_with(database_url: &str, max_connections: u32) -> Result<DbPool> {
        // Create the database directory for file-backed URLs
        let path = database_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");
        let path = path.split('?').next().unwrap_or(path);
        if !path.starts_with(':') {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("Database connected: {}", database_url);

        Self::run_migrations(&pool).await?;

        Ok(pool)
    }

    async fn run_migrations(pool: &DbPool) -> Result<()> {
        info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(pool).await?;

        info!("Database migrations completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_initialize() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_init.db");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let result = Database::initialize(&db_url).await;
        assert!(result.is_ok());

        let pool = result.unwrap();
        assert!(db_path.exists());

        pool.close().await;
    }

    #[tokio::test]
    async fn test_migrations_create_tables() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_tables.db");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let pool = Database::initialize(&db_url).await.unwrap();

        for table in ["local_records", "operation_queue"] {
            let found =
                sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name = ?1")
                    .bind(table)
                    .fetch_optional(&pool)
                    .await
                    .unwrap();
            assert!(found.is_some(), "missing table {table}");
        }

        pool.close().await;
    }
}
