//! BotConfig: everything the binary needs, loaded from env in one place.

use anyhow::Result;
use llm_client::EnvLlmConfig;
use memory::{EnvMemoryConfig, MemoryConfig};

use super::{BaseConfig, PersonalityConfig};
use crate::core::ConfigError;
use crate::session::SessionConfig;

pub struct BotConfig {
    pub base: BaseConfig,
    pub llm: EnvLlmConfig,
    pub memory: EnvMemoryConfig,
    pub personality: PersonalityConfig,
}

impl BotConfig {
    /// Load full config from environment variables. If `token` is provided it overrides BOT_TOKEN.
    /// Call validate() after load to check config before init.
    pub fn load(token: Option<String>) -> Result<Self> {
        Ok(Self {
            base: BaseConfig::load(token)?,
            llm: EnvLlmConfig::from_env()?,
            memory: EnvMemoryConfig::from_env()?,
            personality: PersonalityConfig::from_env(),
        })
    }

    /// Checks what can be checked without touching the network or the store.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.base.validate()
    }

    pub fn base(&self) -> &BaseConfig {
        &self.base
    }

    /// Session settings handed to the session manager.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            default_personality: self.personality.default_personality.clone(),
            context_window: self.memory.context_window(),
            retention: self.memory.retention(),
        }
    }

    pub fn bot_token(&self) -> &str {
        &self.base.bot_token
    }
    pub fn log_file(&self) -> &str {
        &self.base.log_file
    }
    pub fn telegram_api_url(&self) -> Option<&str> {
        self.base.telegram_api_url.as_deref()
    }
    pub fn command_prefix(&self) -> &str {
        &self.base.command_prefix
    }
}
