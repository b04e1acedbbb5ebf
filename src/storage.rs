use std::collections::HashMap;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tokio::sync::Mutex;

use crate::error::StorageError;

pub const USER_KEY: &str = "todo-user";
pub const AUTH_KEY: &str = "todo-auth";
pub const FAVORITES_KEY: &str = "todo-favorites";

/// Key/value persistence for the little state that outlives a process.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn clear(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pub sqlite_pool: SqlitePool,
}

impl SqliteStorage {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let sqlite_pool = SqlitePoolOptions::new()
            // an in-memory database lives and dies with its connection
            .max_connections(if database_url.contains(":memory:") { 1 } else { 5 })
            .connect(database_url)
            .await?;

        Self::new(sqlite_pool).await
    }

    pub async fn new(sqlite_pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )",
        )
        .execute(&sqlite_pool)
        .await?;

        Ok(Self { sqlite_pool })
    }
}

#[async_trait::async_trait]
impl Storage for SqliteStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.sqlite_pool)
                .await?;

        Ok(value)
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.sqlite_pool)
        .await?;

        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.sqlite_pool)
            .await?;

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect();

        Self {
            entries: Mutex::new(entries),
        }
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
