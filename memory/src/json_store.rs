//! Flat-file implementation of the MemoryStore trait: one JSON document per user.
//!
//! Writes go to a temp file in the same directory, are fsynced, then renamed over the target,
//! so a reader (or a restarted process) sees either the old or the new document. The directory is
//! fsynced after the rename so a newly created document survives power loss.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::StorageResult;
use crate::locks::KeyedLocks;
use crate::store::{apply_retention, MemoryStore};
use crate::types::{Turn, UserId};

/// On-disk document for a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDocument {
    #[serde(default)]
    personality: Option<String>,
    #[serde(default)]
    slap_count: u32,
    #[serde(default)]
    turns: Vec<Turn>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserDocument {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            personality: None,
            slap_count: 0,
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Store that keeps each user's memory in `<dir>/<encoded user id>.json`.
pub struct JsonFileStore {
    dir: PathBuf,
    locks: KeyedLocks<UserId>,
}

impl JsonFileStore {
    /// Opens (and creates if missing) the storage directory.
    pub async fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        info!(dir = %dir.display(), "JSON file memory store ready");
        Ok(Self {
            dir,
            locks: KeyedLocks::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, user: &UserId) -> PathBuf {
        self.dir.join(format!("{}.json", encode_file_stem(user.as_str())))
    }

    async fn read_document(&self, user: &UserId) -> StorageResult<Option<UserDocument>> {
        let path = self.path_for(user);
        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            warn!(path = %path.display(), "Empty memory document, treating as absent");
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn write_document(&self, user: &UserId, doc: &UserDocument) -> StorageResult<()> {
        let path = self.path_for(user);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(doc)?;

        let mut tmp = fs::File::create(&tmp_path).await?;
        tmp.write_all(&json).await?;
        tmp.sync_all().await?;
        drop(tmp);

        fs::rename(&tmp_path, &path).await?;
        sync_dir(&self.dir).await?;
        Ok(())
    }

    /// Load-modify-write under the user's lock.
    async fn update<F, R>(&self, user: &UserId, f: F) -> StorageResult<R>
    where
        F: FnOnce(&mut UserDocument) -> R + Send,
    {
        let _guard = self.locks.lock(user).await;
        let mut doc = self
            .read_document(user)
            .await?
            .unwrap_or_else(UserDocument::new);
        let result = f(&mut doc);
        doc.updated_at = Utc::now();
        self.write_document(user, &doc).await?;
        Ok(result)
    }
}

/// Flushes directory entries (the rename) to disk.
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> StorageResult<()> {
    fs::File::open(dir).await?.sync_all().await?;
    Ok(())
}

/// Directories cannot be opened as files here; rename durability is left to the OS.
#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> StorageResult<()> {
    Ok(())
}

/// Maps a user id to a safe file stem: `[A-Za-z0-9_-]` pass through, every other byte becomes `%XX`.
fn encode_file_stem(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for b in id.bytes() {
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

#[async_trait]
impl MemoryStore for JsonFileStore {
    async fn load(&self, user: &UserId) -> StorageResult<Vec<Turn>> {
        let _guard = self.locks.lock(user).await;
        let turns = self
            .read_document(user)
            .await?
            .map(|d| d.turns)
            .unwrap_or_default();
        debug!(user_id = %user, count = turns.len(), "JSON store load returned");
        Ok(turns)
    }

    async fn append_many(
        &self,
        user: &UserId,
        turns: Vec<Turn>,
        retain_latest: Option<usize>,
    ) -> StorageResult<()> {
        let appended = turns.len();
        let stored = self
            .update(user, move |doc| {
                doc.turns.extend(turns);
                apply_retention(&mut doc.turns, retain_latest);
                doc.turns.len()
            })
            .await?;
        info!(user_id = %user, appended, stored, "Turns written to JSON store");
        Ok(())
    }

    async fn clear(&self, user: &UserId) -> StorageResult<()> {
        let _guard = self.locks.lock(user).await;
        if let Some(mut doc) = self.read_document(user).await? {
            if !doc.turns.is_empty() {
                doc.turns.clear();
                doc.updated_at = Utc::now();
                self.write_document(user, &doc).await?;
            }
        }
        Ok(())
    }

    async fn load_personality(&self, user: &UserId) -> StorageResult<Option<String>> {
        let _guard = self.locks.lock(user).await;
        Ok(self.read_document(user).await?.and_then(|d| d.personality))
    }

    async fn save_personality(&self, user: &UserId, name: &str) -> StorageResult<()> {
        let name = name.to_string();
        self.update(user, move |doc| doc.personality = Some(name))
            .await
    }

    async fn increment_slaps(&self, user: &UserId) -> StorageResult<u32> {
        self.update(user, |doc| {
            doc.slap_count += 1;
            doc.slap_count
        })
        .await
    }

    async fn purge(&self, user: &UserId) -> StorageResult<()> {
        let _guard = self.locks.lock(user).await;
        match fs::remove_file(self.path_for(user)).await {
            Ok(()) => sync_dir(&self.dir).await,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
