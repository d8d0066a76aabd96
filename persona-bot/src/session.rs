//! # Session manager
//!
//! Owns the per-user session: the active personality binding and the conversation memory behind
//! it. It is the only writer to the [`MemoryStore`].
//!
//! Every operation for one user runs under that user's lock from [`KeyedLocks`]; operations for
//! different users never wait on each other. Callers that need a model reply take a
//! [`snapshot`](SessionManager::snapshot), release the lock for the inference call, and come back
//! with [`record_exchange`](SessionManager::record_exchange). Two overlapping completions for the
//! same user may therefore both miss each other's in-flight turn; their appends still land as
//! whole, ordered pairs.

use memory::{ContextWindow, KeyedLocks, MemoryStore, StorageError, Turn, UserId, WindowUnit};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::core::{ConfigError, SessionError};
use crate::personality::{Personality, PersonalityCatalog};

/// Explicit session settings handed over at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub default_personality: String,
    /// Bound on the context sent with each completion.
    pub context_window: ContextWindow,
    /// Long-term storage cap; `None` keeps everything.
    pub retention: Option<ContextWindow>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_personality: "default".to_string(),
            context_window: ContextWindow::turns(10),
            retention: Some(ContextWindow::turns(100)),
        }
    }
}

pub struct SessionManager {
    catalog: Arc<PersonalityCatalog>,
    store: Arc<dyn MemoryStore>,
    default_personality: Arc<Personality>,
    context_window: ContextWindow,
    retention: Option<ContextWindow>,
    locks: KeyedLocks<UserId>,
}

impl SessionManager {
    /// Fails when the default personality is not in the catalog or a window limit is zero.
    pub fn new(
        catalog: Arc<PersonalityCatalog>,
        store: Arc<dyn MemoryStore>,
        config: SessionConfig,
    ) -> Result<Self, ConfigError> {
        if config.context_window.limit == 0 {
            return Err(ConfigError::InvalidWindow(
                "context window limit must be at least 1".to_string(),
            ));
        }
        if matches!(config.retention, Some(w) if w.limit == 0) {
            return Err(ConfigError::InvalidWindow(
                "retention limit must be at least 1 (omit it to keep everything)".to_string(),
            ));
        }
        let default_personality = catalog
            .get(&config.default_personality)
            .map_err(|e| ConfigError::UnknownDefaultPersonality(e.name))?;

        info!(
            default_personality = %default_personality.name,
            context_window = %config.context_window,
            retention = ?config.retention.map(|w| w.to_string()),
            personalities = catalog.len(),
            "Session manager ready"
        );
        Ok(Self {
            catalog,
            store,
            default_personality,
            context_window: config.context_window,
            retention: config.retention,
            locks: KeyedLocks::new(),
        })
    }

    pub fn catalog(&self) -> &PersonalityCatalog {
        &self.catalog
    }

    pub fn context_window(&self) -> ContextWindow {
        self.context_window
    }

    pub fn default_personality(&self) -> &Personality {
        &self.default_personality
    }

    /// Caller holds the user's lock. Binds the default on first use.
    async fn resolve_personality(&self, user: &UserId) -> Result<Arc<Personality>, StorageError> {
        match self.store.load_personality(user).await? {
            Some(name) => match self.catalog.get(&name) {
                Ok(profile) => Ok(profile),
                Err(_) => {
                    warn!(
                        user_id = %user,
                        personality = %name,
                        fallback = %self.default_personality.name,
                        "Bound personality no longer in catalog, using default"
                    );
                    Ok(self.default_personality.clone())
                }
            },
            None => {
                self.store
                    .save_personality(user, &self.default_personality.name)
                    .await?;
                debug!(
                    user_id = %user,
                    personality = %self.default_personality.name,
                    "Default personality bound"
                );
                Ok(self.default_personality.clone())
            }
        }
    }

    /// The user's active personality profile (the default for a fresh user).
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn active_personality(
        &self,
        user: &UserId,
    ) -> Result<Arc<Personality>, StorageError> {
        let _guard = self.locks.lock(user).await;
        self.resolve_personality(user).await
    }

    /// Name of the user's active personality.
    pub async fn active_personality_name(&self, user: &UserId) -> Result<String, StorageError> {
        Ok(self.active_personality(user).await?.name.clone())
    }

    /// Binds `name` for the user. Unknown names are rejected and leave the prior binding as is.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn set_personality(
        &self,
        user: &UserId,
        name: &str,
    ) -> Result<Arc<Personality>, SessionError> {
        let profile = self.catalog.get(name)?;
        let _guard = self.locks.lock(user).await;
        self.store.save_personality(user, &profile.name).await?;
        info!(user_id = %user, personality = %profile.name, "Personality set");
        Ok(profile)
    }

    /// Stored turns trimmed to the context window, oldest first.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn get_context(&self, user: &UserId) -> Result<Vec<Turn>, StorageError> {
        let _guard = self.locks.lock(user).await;
        let turns = self.store.load(user).await?;
        Ok(self.context_window.trim(&turns).to_vec())
    }

    /// Personality and trimmed context read in one locked section.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn snapshot(
        &self,
        user: &UserId,
    ) -> Result<(Arc<Personality>, Vec<Turn>), StorageError> {
        let _guard = self.locks.lock(user).await;
        let personality = self.resolve_personality(user).await?;
        let turns = self.store.load(user).await?;
        let context = self.context_window.trim(&turns).to_vec();
        debug!(
            user_id = %user,
            stored = turns.len(),
            context = context.len(),
            personality = %personality.name,
            "Session snapshot taken"
        );
        Ok((personality, context))
    }

    /// Appends the user turn then the assistant turn, applying retention in the same store call.
    #[instrument(skip(self, user_turn, assistant_turn), fields(user_id = %user))]
    pub async fn record_exchange(
        &self,
        user: &UserId,
        user_turn: Turn,
        assistant_turn: Turn,
    ) -> Result<(), StorageError> {
        let _guard = self.locks.lock(user).await;
        let turns = vec![user_turn, assistant_turn];
        let retain_latest = self.retain_latest(user, &turns).await?;
        self.store.append_many(user, turns, retain_latest).await?;
        debug!(user_id = %user, retain_latest = ?retain_latest, "Exchange recorded");
        Ok(())
    }

    /// Caller holds the user's lock.
    async fn retain_latest(
        &self,
        user: &UserId,
        appended: &[Turn],
    ) -> Result<Option<usize>, StorageError> {
        match self.retention {
            None => Ok(None),
            Some(window) if window.unit == WindowUnit::Turns => Ok(Some(window.limit)),
            Some(window) => {
                let mut all = self.store.load(user).await?;
                all.extend_from_slice(appended);
                Ok(Some(window.retain_count(&all)))
            }
        }
    }

    /// Clears the conversation; the personality binding stays.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn reset(&self, user: &UserId) -> Result<(), StorageError> {
        let _guard = self.locks.lock(user).await;
        self.store.clear(user).await?;
        info!(user_id = %user, "Conversation reset");
        Ok(())
    }

    /// Removes everything stored for the user; the next read binds the default again.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn delete_user_data(&self, user: &UserId) -> Result<(), StorageError> {
        let _guard = self.locks.lock(user).await;
        self.store.purge(user).await?;
        info!(user_id = %user, "User data deleted");
        Ok(())
    }

    /// Full retained history, oldest first.
    pub async fn history(&self, user: &UserId) -> Result<Vec<Turn>, StorageError> {
        let _guard = self.locks.lock(user).await;
        self.store.load(user).await
    }

    pub async fn record_slap(&self, user: &UserId) -> Result<u32, StorageError> {
        let _guard = self.locks.lock(user).await;
        self.store.increment_slaps(user).await
    }
}
