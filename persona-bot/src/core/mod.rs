//! Core types and traits: Handler, Bot, Message, HandlerResponse, errors, logger.
//! Transport-agnostic.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::Bot;
pub use error::{BotError, CompletionError, ConfigError, NotFound, Result, SessionError};
pub use logger::init_tracing;
pub use types::{Chat, Handler, HandlerResponse, Message, ToCoreMessage, ToCoreUser, User};
