//! In-memory implementation of the MemoryStore trait.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::StorageResult;
use crate::store::{apply_retention, MemoryStore};
use crate::types::{Turn, UserId};

#[derive(Debug, Clone, Default)]
struct UserRecord {
    personality: Option<String>,
    slap_count: u32,
    turns: Vec<Turn>,
}

/// In-memory store for testing and development. Nothing survives the process.
///
/// Records live in a sharded map; a write locks only the shard holding that user, and no guard is
/// held across an await.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Arc<DashMap<UserId, UserRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with any stored data.
    pub fn user_count(&self) -> usize {
        self.records.len()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn load(&self, user: &UserId) -> StorageResult<Vec<Turn>> {
        let turns = self
            .records
            .get(user)
            .map(|r| r.turns.clone())
            .unwrap_or_default();
        debug!(user_id = %user, count = turns.len(), "In-memory store load returned");
        Ok(turns)
    }

    async fn append_many(
        &self,
        user: &UserId,
        turns: Vec<Turn>,
        retain_latest: Option<usize>,
    ) -> StorageResult<()> {
        let appended = turns.len();
        let stored = {
            let mut record = self.records.entry(user.clone()).or_default();
            record.turns.extend(turns);
            apply_retention(&mut record.turns, retain_latest);
            record.turns.len()
        };
        info!(
            user_id = %user,
            appended,
            stored,
            "Turns written to in-memory store"
        );
        Ok(())
    }

    async fn clear(&self, user: &UserId) -> StorageResult<()> {
        if let Some(mut record) = self.records.get_mut(user) {
            record.turns.clear();
        }
        Ok(())
    }

    async fn load_personality(&self, user: &UserId) -> StorageResult<Option<String>> {
        Ok(self.records.get(user).and_then(|r| r.personality.clone()))
    }

    async fn save_personality(&self, user: &UserId, name: &str) -> StorageResult<()> {
        self.records.entry(user.clone()).or_default().personality = Some(name.to_string());
        Ok(())
    }

    async fn increment_slaps(&self, user: &UserId) -> StorageResult<u32> {
        let mut record = self.records.entry(user.clone()).or_default();
        record.slap_count += 1;
        Ok(record.slap_count)
    }

    async fn purge(&self, user: &UserId) -> StorageResult<()> {
        self.records.remove(user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_load_preserve_order() {
        let store = InMemoryStore::new();
        let user = UserId::from("user123");
        store.append(&user, Turn::user("one")).await.unwrap();
        store.append(&user, Turn::assistant("two")).await.unwrap();
        let turns = store.load(&user).await.unwrap();
        let contents: Vec<_> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_load_unknown_user_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.load(&UserId::from("nobody")).await.unwrap().is_empty());
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn test_clear_keeps_personality() {
        let store = InMemoryStore::new();
        let user = UserId::from("u");
        store.save_personality(&user, "pirate").await.unwrap();
        store.append(&user, Turn::user("hi")).await.unwrap();
        store.clear(&user).await.unwrap();
        store.clear(&user).await.unwrap();
        assert!(store.load(&user).await.unwrap().is_empty());
        assert_eq!(store.load_personality(&user).await.unwrap().as_deref(), Some("pirate"));
    }

    #[tokio::test]
    async fn test_purge_removes_everything() {
        let store = InMemoryStore::new();
        let user = UserId::from("u");
        store.save_personality(&user, "poetic").await.unwrap();
        store.increment_slaps(&user).await.unwrap();
        store.purge(&user).await.unwrap();
        assert!(store.load_personality(&user).await.unwrap().is_none());
        assert_eq!(store.increment_slaps(&user).await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_users_each_keep_their_turns() {
        let store = InMemoryStore::new();
        let mut handles = Vec::new();
        for u in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let user = UserId::from(format!("user{}", u));
                for i in 0..10 {
                    store
                        .append_many(
                            &user,
                            vec![Turn::user(format!("q{}", i)), Turn::assistant(format!("a{}", i))],
                            None,
                        )
                        .await
                        .unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.user_count(), 16);
        for u in 0..16 {
            let turns = store.load(&UserId::from(format!("user{}", u))).await.unwrap();
            assert_eq!(turns.len(), 20);
            assert_eq!(turns[0].content, "q0");
            assert_eq!(turns[19].content, "a9");
        }
    }
}
