//! Durable storage for the bearer token.
//!
//! The client keeps a single string value under a fixed key, the same shape a
//! browser's local storage would hold. [`SqliteStorage`] is the durable backend;
//! [`MemoryStorage`] forgets everything when the process exits.

use std::sync::Mutex;

use futures_util::future::{BoxFuture, FutureExt};
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};
use tracing::info;

use crate::error::StorageError;

/// Key the token is stored under.
pub const TOKEN_KEY: &str = "token";

pub trait TokenStorage: Send + Sync {
    fn read(&self) -> BoxFuture<'_, Result<Option<String>, StorageError>>;
    fn write<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;
    fn remove(&self) -> BoxFuture<'_, Result<(), StorageError>>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    value: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.value.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenStorage for MemoryStorage {
    fn read(&self) -> BoxFuture<'_, Result<Option<String>, StorageError>> {
        let value = self.slot().clone();
        async move { Ok(value) }.boxed()
    }

    fn write<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        *self.slot() = Some(token.to_string());
        async { Ok(()) }.boxed()
    }

    fn remove(&self) -> BoxFuture<'_, Result<(), StorageError>> {
        self.slot().take();
        async { Ok(()) }.boxed()
    }
}

pub struct SqliteStorage {
    db: Pool<Sqlite>,
}

impl SqliteStorage {
    /// Opens (creating if needed) the SQLite database at `db_url`.
    pub async fn open(db_url: &str) -> Result<Self, StorageError> {
        // Check if the database exists, if not, create it
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating session database {db_url}");
            Sqlite::create_database(db_url).await?;
        }

        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(db_url)
            .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS local_storage (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );"#,
        )
        .execute(&db)
        .await?;

        Ok(Self { db })
    }
}

impl TokenStorage for SqliteStorage {
    fn read(&self) -> BoxFuture<'_, Result<Option<String>, StorageError>> {
        async move {
            let value =
                sqlx::query_scalar::<_, String>("SELECT value FROM local_storage WHERE key = ?")
                    .bind(TOKEN_KEY)
                    .fetch_optional(&self.db)
                    .await?;
            Ok(value)
        }
        .boxed()
    }

    fn write<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            sqlx::query(
                "INSERT INTO local_storage (key, value) VALUES (?, ?) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )
            .bind(TOKEN_KEY)
            .bind(token)
            .execute(&self.db)
            .await?;
            Ok(())
        }
        .boxed()
    }

    fn remove(&self) -> BoxFuture<'_, Result<(), StorageError>> {
        async move {
            sqlx::query("DELETE FROM local_storage WHERE key = ?")
                .bind(TOKEN_KEY)
                .execute(&self.db)
                .await?;
            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_url(dir: &tempfile::TempDir) -> String {
        format!("sqlite://{}", dir.path().join("session.db").display())
    }

    #[tokio::test]
    async fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.read().await.unwrap(), None);

        storage.write("abc").await.unwrap();
        assert_eq!(storage.read().await.unwrap().as_deref(), Some("abc"));

        storage.remove().await.unwrap();
        storage.remove().await.unwrap();
        assert_eq!(storage.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn sqlite_storage_creates_database_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::open(&db_url(&dir)).await.unwrap();

        assert_eq!(storage.read().await.unwrap(), None);
        storage.write("first").await.unwrap();
        storage.write("second").await.unwrap();
        assert_eq!(storage.read().await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn sqlite_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = db_url(&dir);

        {
            let storage = SqliteStorage::open(&url).await.unwrap();
            storage.write("persisted").await.unwrap();
        }

        let reopened = SqliteStorage::open(&url).await.unwrap();
        assert_eq!(reopened.read().await.unwrap().as_deref(), Some("persisted"));

        reopened.remove().await.unwrap();
        assert_eq!(reopened.read().await.unwrap(), None);
    }
}
