//! Main entry: validate config, init logging, build components, run the REPL.

use anyhow::Result;
use tracing::{info, instrument};

use crate::components::{build_bot_components, build_handler_chain};
use crate::config::BotConfig;
use crate::core::init_tracing;
use crate::telegram::run_repl;

#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file())?;

    info!(
        llm_api_url = %config.llm.llm_api_url,
        llm_model = %config.llm.llm_model,
        memory_store_type = %config.memory.memory_store_type,
        command_prefix = %config.command_prefix(),
        "Initializing bot"
    );

    let components = build_bot_components(&config).await?;
    let handler_chain = build_handler_chain(&components, config.command_prefix());

    info!("Bot started successfully");
    run_repl(
        components.teloxide_bot.clone(),
        handler_chain,
        components.bot_username.clone(),
    )
    .await
}
