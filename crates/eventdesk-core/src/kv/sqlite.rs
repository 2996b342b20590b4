//! Durable key-value backend on a `SQLite` file.

use std::path::Path;

use sqlx::{Pool, Sqlite};

use super::{KvBackend, StorageError};
use crate::db::{self, DatabaseError, unix_timestamp};

/// `SQLite`-backed store using a single `kv_entries` table.
#[derive(Debug, Clone)]
pub struct SqliteKv {
    pool: Pool<Sqlite>,
}

impl SqliteKv {
    /// Open or create a store at the given path.
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        let pool = db::open_pool(path).await?;
        db::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Open an in-memory store (for testing).
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        let pool = db::open_pool_in_memory().await?;
        db::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the pool, waiting for in-flight queries.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn backend_err(e: &sqlx::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

impl KvBackend for SqliteKv {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend_err(&e))?;
        Ok(row.map(|(value,)| value))
    }

    async fn write(&self, key: &str, value: String) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| backend_err(&e))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| backend_err(&e))?;
        Ok(())
    }
}
