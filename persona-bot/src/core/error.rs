//! Error types for the bot.
//!
//! [`BotError`] is the top-level error. [`ConfigError`] aborts startup; [`SessionError`] and
//! [`CompletionError`] are per-command and reported back to the user.

use llm_client::InferenceError;
use memory::StorageError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error (bot transport, config, session, completion, IO).
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid startup configuration. Fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Duplicate personality name: {0}")]
    DuplicatePersonality(String),

    #[error("Personality #{index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("Personality catalog is empty")]
    EmptyCatalog,

    #[error("Cannot read personality file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed personality catalog: {0}")]
    Parse(String),

    #[error("Default personality `{0}` is not in the catalog")]
    UnknownDefaultPersonality(String),

    #[error("Invalid context window: {0}")]
    InvalidWindow(String),

    #[error("TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {0}")]
    InvalidUrl(String),
}

/// Lookup of a personality name that the catalog does not contain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown personality: {name}")]
pub struct NotFound {
    pub name: String,
}

/// Failure of a session operation.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    PersonalityNotFound(#[from] NotFound),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Failure of a completion. Memory is unchanged when `Inference` is returned.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for bot operations; uses [`BotError`].
pub type Result<T> = std::result::Result<T, BotError>;
