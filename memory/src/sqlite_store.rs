//! SQLite implementation of the MemoryStore trait.
//!
//! ```sql
//! CREATE TABLE users (
//!     user_id     TEXT PRIMARY KEY,
//!     personality TEXT,
//!     slap_count  INTEGER NOT NULL DEFAULT 0,
//!     created_at  TEXT NOT NULL,
//!     updated_at  TEXT NOT NULL
//! );
//! CREATE TABLE turns (
//!     seq       INTEGER PRIMARY KEY AUTOINCREMENT,
//!     user_id   TEXT NOT NULL,
//!     role      TEXT NOT NULL,
//!     content   TEXT NOT NULL,
//!     timestamp TEXT NOT NULL
//! );
//! ```
//!
//! Turn order is the autoincrement `seq`, never the timestamp. Each mutation runs in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::store::MemoryStore;
use crate::types::{Turn, UserId};

/// SQLite-based store for persistent memory.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the database file (created if missing) and ensures the schema exists.
    pub async fn new(database_path: &str) -> StorageResult<Self> {
        let options = SqliteConnectOptions::new()
            .create_if_missing(true)
            .filename(database_path)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePool::connect_with(options).await?;
        let store = Self { pool };
        store.init_schema().await?;
        info!(db_path = %database_path, "SQLite memory store ready");
        Ok(store)
    }

    async fn init_schema(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                personality TEXT,
                slap_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_turns_user_seq ON turns(user_id, seq)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn row_to_turn(row: &sqlx::sqlite::SqliteRow) -> StorageResult<Turn> {
        let role: String = row.try_get("role")?;
        let content: String = row.try_get("content")?;
        let timestamp: String = row.try_get("timestamp")?;
        let timestamp = DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| StorageError::Corrupt(format!("bad timestamp {}: {}", timestamp, e)))?
            .with_timezone(&Utc);
        Ok(Turn {
            role: role.parse()?,
            content,
            timestamp,
        })
    }
}

#[async_trait]
impl MemoryStore for SqliteStore {
    async fn load(&self, user: &UserId) -> StorageResult<Vec<Turn>> {
        let rows = sqlx::query(
            "SELECT role, content, timestamp FROM turns WHERE user_id = ?1 ORDER BY seq ASC",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;
        let turns = rows
            .iter()
            .map(Self::row_to_turn)
            .collect::<StorageResult<Vec<_>>>()?;
        debug!(user_id = %user, count = turns.len(), "SQLite store load returned");
        Ok(turns)
    }

    async fn append_many(
        &self,
        user: &UserId,
        turns: Vec<Turn>,
        retain_latest: Option<usize>,
    ) -> StorageResult<()> {
        let appended = turns.len();
        let mut tx = self.pool.begin().await?;
        for turn in &turns {
            sqlx::query(
                "INSERT INTO turns (user_id, role, content, timestamp) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(user.as_str())
            .bind(turn.role.as_str())
            .bind(&turn.content)
            .bind(turn.timestamp.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }
        if let Some(keep) = retain_latest {
            let evicted = sqlx::query(
                r#"
                DELETE FROM turns
                WHERE user_id = ?1 AND seq NOT IN (
                    SELECT seq FROM turns WHERE user_id = ?1 ORDER BY seq DESC LIMIT ?2
                )
                "#,
            )
            .bind(user.as_str())
            .bind(keep as i64)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if evicted > 0 {
                debug!(user_id = %user, evicted, "Evicted turns beyond retention");
            }
        }
        tx.commit().await?;
        info!(user_id = %user, appended, "Turns written to SQLite store");
        Ok(())
    }

    async fn clear(&self, user: &UserId) -> StorageResult<()> {
        sqlx::query("DELETE FROM turns WHERE user_id = ?1")
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn load_personality(&self, user: &UserId) -> StorageResult<Option<String>> {
        let row = sqlx::query("SELECT personality FROM users WHERE user_id = ?1")
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(r) => Ok(r.try_get::<Option<String>, _>("personality")?),
            None => Ok(None),
        }
    }

    async fn save_personality(&self, user: &UserId, name: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO users (user_id, personality, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT(user_id) DO UPDATE SET
                personality = excluded.personality,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user.as_str())
        .bind(name)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn increment_slaps(&self, user: &UserId) -> StorageResult<u32> {
        let now = Utc::now().to_rfc3339();
        let row = sqlx::query(
            r#"
            INSERT INTO users (user_id, slap_count, created_at, updated_at)
            VALUES (?1, 1, ?2, ?2)
            ON CONFLICT(user_id) DO UPDATE SET
                slap_count = slap_count + 1,
                updated_at = excluded.updated_at
            RETURNING slap_count
            "#,
        )
        .bind(user.as_str())
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;
        let count: i64 = row.try_get("slap_count")?;
        Ok(count as u32)
    }

    async fn purge(&self, user: &UserId) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM turns WHERE user_id = ?1")
            .bind(user.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE user_id = ?1")
            .bind(user.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
