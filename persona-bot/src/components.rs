//! Builds the bot's long-lived components from [`BotConfig`].

use anyhow::Result;
use llm_client::{LlmClient, LlmConfig, OpenAILlmClient};
use memory::{InMemoryStore, JsonFileStore, MemoryConfig, MemoryStore, SqliteStore, StoreType};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;

use crate::chain::HandlerChain;
use crate::commands::CommandHandler;
use crate::config::{BotConfig, PersonalityConfig};
use crate::core::{Bot as CoreBot, ConfigError};
use crate::handlers::LoggingHandler;
use crate::orchestrator::CompletionOrchestrator;
use crate::personality::PersonalityCatalog;
use crate::session::SessionManager;
use crate::telegram::TelegramBotAdapter;

/// Components shared by the handler chain and the REPL.
#[derive(Clone)]
pub struct BotComponents {
    pub teloxide_bot: Bot,
    pub bot_adapter: Arc<dyn CoreBot>,
    pub bot_username: Arc<tokio::sync::RwLock<Option<String>>>,
    pub sessions: Arc<SessionManager>,
    pub orchestrator: Arc<CompletionOrchestrator>,
}

/// Opens the configured memory backend.
pub async fn create_memory_store(config: &dyn MemoryConfig) -> Result<Arc<dyn MemoryStore>> {
    let store: Arc<dyn MemoryStore> = match config.store_type() {
        StoreType::Memory => Arc::new(InMemoryStore::new()),
        StoreType::Json => Arc::new(JsonFileStore::new(config.json_dir()).await?),
        StoreType::Sqlite => {
            let path = config.sqlite_path();
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            Arc::new(SqliteStore::new(&path.to_string_lossy()).await?)
        }
    };
    info!(
        store_type = %config.store_type(),
        storage_path = %config.storage_path(),
        "Memory store ready"
    );
    Ok(store)
}

/// Catalog file when configured, otherwise the built-in presets.
pub fn load_catalog(
    config: &PersonalityConfig,
    llm: &dyn LlmConfig,
) -> std::result::Result<PersonalityCatalog, ConfigError> {
    match &config.personalities_file {
        Some(path) => PersonalityCatalog::load(path, llm.generation_params()),
        None => Ok(PersonalityCatalog::builtin(llm.generation_params())),
    }
}

/// Session layer over `store`, with the catalog from config.
pub fn build_sessions(
    config: &BotConfig,
    store: Arc<dyn MemoryStore>,
) -> std::result::Result<Arc<SessionManager>, ConfigError> {
    let catalog = Arc::new(load_catalog(&config.personality, &config.llm)?);
    Ok(Arc::new(SessionManager::new(
        catalog,
        store,
        config.session_config(),
    )?))
}

fn teloxide_bot(config: &BotConfig) -> std::result::Result<Bot, ConfigError> {
    let bot = Bot::new(config.bot_token());
    match config.telegram_api_url() {
        Some(url_str) => {
            let url = reqwest::Url::parse(url_str)
                .map_err(|_| ConfigError::InvalidUrl(url_str.to_string()))?;
            Ok(bot.set_api_url(url))
        }
        None => Ok(bot),
    }
}

/// Builds every component. Fails on invalid configuration or an unreachable store.
pub async fn build_bot_components(config: &BotConfig) -> Result<BotComponents> {
    let store = create_memory_store(&config.memory).await?;
    let sessions = build_sessions(config, store)?;

    let llm: Arc<dyn LlmClient> = Arc::new(OpenAILlmClient::from_config(&config.llm));
    let orchestrator = Arc::new(CompletionOrchestrator::new(sessions.clone(), llm));

    let teloxide_bot = teloxide_bot(config)?;
    let bot_adapter: Arc<dyn CoreBot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));

    Ok(BotComponents {
        teloxide_bot,
        bot_adapter,
        bot_username: Arc::new(tokio::sync::RwLock::new(None)),
        sessions,
        orchestrator,
    })
}

/// Logging handler → command handler.
pub fn build_handler_chain(components: &BotComponents, command_prefix: &str) -> HandlerChain {
    let command_handler = CommandHandler::new(
        components.orchestrator.clone(),
        components.bot_adapter.clone(),
        components.bot_username.clone(),
        command_prefix,
    );
    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(command_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_client::EnvLlmConfig;
    use memory::{EnvMemoryConfig, Turn, UserId};

    fn memory_config(store_type: StoreType, dir: &std::path::Path) -> EnvMemoryConfig {
        EnvMemoryConfig {
            memory_store_type: store_type,
            memory_storage_path: dir.to_string_lossy().into_owned(),
            ..EnvMemoryConfig::default()
        }
    }

    #[tokio::test]
    async fn test_create_sqlite_store_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        let store = create_memory_store(&memory_config(StoreType::Sqlite, &nested))
            .await
            .unwrap();
        store
            .append(&UserId::from(1), Turn::user("hi"))
            .await
            .unwrap();
        assert!(nested.join("memory.db").exists());
    }

    #[tokio::test]
    async fn test_create_json_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_memory_store(&memory_config(StoreType::Json, dir.path()))
            .await
            .unwrap();
        assert!(store.load(&UserId::from(1)).await.unwrap().is_empty());
    }

    #[test]
    fn test_load_catalog_falls_back_to_builtin() {
        let catalog = load_catalog(&PersonalityConfig::default(), &EnvLlmConfig::default()).unwrap();
        assert!(catalog.contains("coding_tutor"));
    }
}
