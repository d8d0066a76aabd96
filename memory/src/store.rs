//! Memory storage trait.
//!
//! A backend keeps, per [`UserId`], an ordered list of [`Turn`]s, the active personality
//! binding and a small counter record. Every mutation is atomic per user and durable once the
//! call returns.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::{Turn, UserId};

#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// All stored turns for `user`, oldest first. Empty when nothing was persisted.
    async fn load(&self, user: &UserId) -> StorageResult<Vec<Turn>>;

    /// Appends `turns` in order. When `retain_latest` is set, only that many newest turns
    /// (counting the appended ones) survive. Append and eviction form one atomic unit.
    async fn append_many(
        &self,
        user: &UserId,
        turns: Vec<Turn>,
        retain_latest: Option<usize>,
    ) -> StorageResult<()>;

    /// Appends a single turn without eviction.
    async fn append(&self, user: &UserId, turn: Turn) -> StorageResult<()> {
        self.append_many(user, vec![turn], None).await
    }

    /// Deletes every turn of `user`. Idempotent; leaves the personality binding alone.
    async fn clear(&self, user: &UserId) -> StorageResult<()>;

    /// The persisted personality name, if one was ever bound.
    async fn load_personality(&self, user: &UserId) -> StorageResult<Option<String>>;

    async fn save_personality(&self, user: &UserId, name: &str) -> StorageResult<()>;

    /// Increments and returns the user's slap counter.
    async fn increment_slaps(&self, user: &UserId) -> StorageResult<u32>;

    /// Removes all data held for `user` (turns, binding, counters). Idempotent.
    async fn purge(&self, user: &UserId) -> StorageResult<()>;
}

/// Applies `retain_latest` to an in-memory turn list.
pub(crate) fn apply_retention(turns: &mut Vec<Turn>, retain_latest: Option<usize>) {
    if let Some(keep) = retain_latest {
        if turns.len() > keep {
            let excess = turns.len() - keep;
            turns.drain(..excess);
        }
    }
}
