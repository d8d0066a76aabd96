//! Base config: Telegram connection, logging, command prefix. Loaded from env.

use anyhow::Result;
use std::env;

use crate::core::ConfigError;

#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// LOG_FILE
    pub log_file: String,
    /// COMMAND_PREFIX
    pub command_prefix: String,
}

impl BaseConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok()
            .filter(|s| !s.trim().is_empty());
        let log_file =
            env::var("LOG_FILE").unwrap_or_else(|_| "logs/persona-bot.log".to_string());
        let command_prefix = env::var("COMMAND_PREFIX")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "/".to_string());

        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file,
            command_prefix,
        })
    }

    /// The Telegram API URL must parse when set.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                return Err(ConfigError::InvalidUrl(url_str.clone()));
            }
        }
        Ok(())
    }
}
