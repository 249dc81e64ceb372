use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::fs;

use crate::entity::PortfolioResult;

/// Durable key/value storage capability
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> PortfolioResult<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: &[u8]) -> PortfolioResult<()>;
}

/// One file per key inside a directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys such as "portfolio:watchlist" become "portfolio_watchlist.json"
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> PortfolioResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No stored value at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> PortfolioResult<()> {
        fs::create_dir_all(&self.dir).await?;

        // Write to a sibling temp file first so a crash never leaves a torn file
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value).await?;
        fs::rename(&tmp_path, &path).await?;

        debug!("Stored {} bytes at {}", value.len(), path.display());
        Ok(())
    }
}

/// Process-local storage, used by tests and ephemeral runs
#[derive(Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> PortfolioResult<Option<Vec<u8>>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> PortfolioResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// PostgreSQL-backed storage, table `kv_store` (see migrations/)
pub struct PostgresStorage {
    db_pool: Arc<PgPool>,
}

impl PostgresStorage {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        info!("Using PostgreSQL key/value storage");
        Self { db_pool }
    }
}

#[async_trait]
impl KeyValueStorage for PostgresStorage {
    async fn get(&self, key: &str) -> PortfolioResult<Option<Vec<u8>>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = $1")
            .bind(key)
            .fetch_optional(&*self.db_pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get::<Vec<u8>, _>("value")?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> PortfolioResult<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES ($1, $2, $3) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&*self.db_pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn file_storage_round_trip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get("portfolio:watchlist").await.unwrap(), None);

        storage.set("portfolio:watchlist", b"{\"tokens\":{}}").await.unwrap();
        storage.set("portfolio:watchlist", b"{\"tokens\":{\"a\":1}}").await.unwrap();

        let stored = storage.get("portfolio:watchlist").await.unwrap().unwrap();
        assert_eq!(stored, b"{\"tokens\":{\"a\":1}}".to_vec());
        assert!(dir.path().join("nested/portfolio_watchlist.json").exists());
        assert!(!dir.path().join("nested/portfolio_watchlist.json.tmp").exists());
    }

    #[tokio::test]
    async fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").await.unwrap(), None);

        storage.set("k", b"v").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), Some(b"v".to_vec()));
    }
}
