//! Durable storage for the analysis history.
//!
//! The whole history is one JSON array stored under a fixed key in a small
//! key-value table, so every mutation rewrites it.
use crate::{HistoryEntry, HistoryError};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

/// Key the serialized history lives under.
pub const HISTORY_KEY: &str = "socialAnalyzerHistory";

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Read the persisted history, newest first.
    async fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError>;

    /// Replace the persisted history.
    async fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError>;
}

pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Open (creating if needed) the database at `url`, e.g.
    /// `sqlite://history.db?mode=rwc` or `sqlite::memory:`.
    pub async fn connect(url: &str) -> Result<Self, HistoryError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // a single long-lived connection keeps `sqlite::memory:` alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Result<Self, HistoryError> {
        sqlx::query("CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)")
            .execute(&pool)
            .await?;
        Ok(Self { pool })
    }

    async fn read_raw(&self) -> Result<Option<String>, HistoryError> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?")
            .bind(HISTORY_KEY)
            .fetch_optional(&self.pool)
            .await?;
        Ok(match row {
            Some(row) => Some(row.try_get::<String, _>("value")?),
            None => None,
        })
    }

    #[cfg(test)]
    async fn write_raw(&self, value: &str) -> Result<(), HistoryError> {
        upsert(&self.pool, value).await
    }
}

async fn upsert(pool: &SqlitePool, value: &str) -> Result<(), HistoryError> {
    sqlx::query(
        r#"
        INSERT INTO kv (key, value) VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(HISTORY_KEY)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let Some(raw) = self.read_raw().await? else {
            tracing::debug!("history.load.empty");
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => {
                tracing::debug!(entries = entries.len(), "history.load");
                Ok(entries)
            }
            Err(err) => {
                tracing::warn!(error = %err, bytes = raw.len(), "history.load.corrupt");
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let raw = serde_json::to_string(entries)?;
        upsert(&self.pool, &raw).await?;
        tracing::debug!(entries = entries.len(), "history.save");
        Ok(())
    }
}
