//! # persona-bot
//!
//! Telegram front end for a locally hosted LLM. Each user gets their own conversation memory and
//! a switchable personality.
//!
//! - [`personality`]: [`PersonalityCatalog`] of named profiles
//! - [`session`]: [`SessionManager`], per-user personality binding and windowed memory
//! - [`orchestrator`]: [`CompletionOrchestrator`], prompt → inference → record
//! - [`commands`]: command parsing and the [`CommandHandler`]
//! - [`chain`], [`core`], [`telegram`]: handler chain, transport-agnostic types, teloxide adapter
//!
//! ## External interactions
//!
//! - **Telegram**: teloxide long polling.
//! - **LLM**: OpenAI-compatible `/chat/completions` on a local server.
//! - **Storage**: JSON files or SQLite, see the `memory` crate.

pub mod chain;
pub mod cli;
pub mod commands;
pub mod components;
pub mod config;
pub mod core;
pub mod handlers;
pub mod mention;
pub mod orchestrator;
pub mod personality;
pub mod runner;
pub mod session;
pub mod telegram;

pub use chain::HandlerChain;
pub use cli::{load_config, Cli, Commands};
pub use commands::{Command, CommandHandler};
pub use components::{build_bot_components, build_handler_chain, create_memory_store, BotComponents};
pub use config::{BaseConfig, BotConfig, PersonalityConfig};
pub use core::{
    init_tracing, Bot, BotError, Chat, CompletionError, ConfigError, Handler, HandlerResponse,
    Message, NotFound, Result, SessionError, ToCoreMessage, ToCoreUser, User,
};
pub use handlers::LoggingHandler;
pub use orchestrator::CompletionOrchestrator;
pub use personality::{Personality, PersonalityCatalog};
pub use runner::run_bot;
pub use session::{SessionConfig, SessionManager};
pub use telegram::{run_repl, TelegramBotAdapter};
