//! REPL runner: converts teloxide messages to core::Message and passes them to the HandlerChain,
//! one spawned task per message.

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info, instrument, warn};

use super::adapters::TelegramMessageWrapper;
use crate::chain::HandlerChain;
use crate::core::ToCoreMessage;

/// Starts the REPL. Calls get_me() first to fill `bot_username` (for @mention detection) and the
/// bot id (for reply-to-bot detection).
#[instrument(skip(bot, handler_chain, bot_username))]
pub async fn run_repl(
    bot: teloxide::Bot,
    handler_chain: HandlerChain,
    bot_username: Arc<tokio::sync::RwLock<Option<String>>>,
) -> Result<()> {
    let bot_id = match bot.get_me().await {
        Ok(me) => {
            if let Some(username) = &me.user.username {
                *bot_username.write().await = Some(username.clone());
                info!(username = %username, "Bot username set before repl");
            }
            Some(me.user.id)
        }
        Err(e) => {
            warn!(error = %e, "get_me failed; mentions and replies to the bot will not be detected");
            None
        }
    };

    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let chain = handler_chain.clone();
        async move {
            if msg.text().is_none() {
                info!(chat_id = msg.chat.id.0, "Ignoring non-text message");
                return Ok(());
            }
            if msg.from.as_ref().is_some_and(|u| Some(u.id) == bot_id) {
                return Ok(());
            }
            let core_msg = TelegramMessageWrapper::new(&msg, bot_id).to_core();

            tokio::spawn(async move {
                if let Err(e) = chain.handle(&core_msg).await {
                    error!(error = %e, user_id = core_msg.user.id, "Handler chain failed");
                }
            });
            Ok(())
        }
    })
    .await;

    Ok(())
}
