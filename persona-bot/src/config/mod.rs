//! Bot configuration: BaseConfig (Telegram + log + command prefix), personality settings, and the
//! LLM / memory configs owned by their crates.

mod base;
mod bot_config;
mod personality;


pub use base::BaseConfig;
pub use bot_config::BotConfig;
pub use personality::PersonalityConfig;
