//! # Memory
//!
//! Per-user conversation memory for the bot.
//!
//! - [`types`]: [`UserId`], [`Role`], [`Turn`]
//! - [`store`]: the [`MemoryStore`] capability (load / append / clear plus personality binding)
//! - [`window`]: [`ContextWindow`] and the oldest-first trim algorithm
//! - [`locks`]: [`KeyedLocks`] for per-user serialisation
//! - Backends: [`InMemoryStore`], [`JsonFileStore`], [`SqliteStore`]
//! - [`config`]: env-based backend and window selection
//!
//! ## External interactions
//!
//! - **Filesystem**: JSON documents (one per user) written by temp file + rename.
//! - **SQLite**: via `sqlx`, one transaction per mutation.

pub mod config;
pub mod error;
pub mod inmemory_store;
pub mod json_store;
pub mod locks;
pub mod sqlite_store;
pub mod store;
pub mod types;
pub mod window;

pub use config::{EnvMemoryConfig, MemoryConfig, StoreType};
pub use error::{StorageError, StorageResult};
pub use inmemory_store::InMemoryStore;
pub use json_store::JsonFileStore;
pub use locks::KeyedLocks;
pub use sqlite_store::SqliteStore;
pub use store::MemoryStore;
pub use types::{Role, Turn, UserId};
pub use window::{estimate_tokens, ContextWindow, WindowUnit};
