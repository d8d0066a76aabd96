//! Command handler: executes parsed commands against the session layer and sends the reply.

use async_trait::async_trait;
use memory::UserId;
use prompt::format_transcript;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use super::parser::{parse_message, Command, MemoryAction, PersonalityAction};
use super::reply::{self, split_message, MAX_MESSAGE_CHARS};
use crate::core::{Bot, CompletionError, Handler, HandlerResponse, Message, Result, SessionError};
use crate::mention::is_bot_mentioned;
use crate::orchestrator::{turn_to_chat_message, CompletionOrchestrator};
use crate::session::SessionManager;

/// Terminal handler of the chain: parses the message, runs the command, replies.
pub struct CommandHandler {
    orchestrator: Arc<CompletionOrchestrator>,
    bot: Arc<dyn Bot>,
    bot_username: Arc<RwLock<Option<String>>>,
    prefix: String,
}

impl CommandHandler {
    pub fn new(
        orchestrator: Arc<CompletionOrchestrator>,
        bot: Arc<dyn Bot>,
        bot_username: Arc<RwLock<Option<String>>>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            orchestrator,
            bot,
            bot_username,
            prefix: prefix.into(),
        }
    }

    fn sessions(&self) -> &SessionManager {
        self.orchestrator.sessions()
    }

    async fn typing(&self, message: &Message) {
        if let Err(e) = self.bot.send_typing(&message.chat).await {
            warn!(error = %e, chat_id = message.chat.id, "Failed to send typing indicator");
        }
    }

    /// Runs `command` for the sender of `message` and returns the reply text.
    /// Errors are logged and turned into user-facing lines.
    #[instrument(skip(self, message), fields(user_id = message.user.id))]
    pub async fn execute(&self, command: Command, message: &Message) -> String {
        let user = message.user.user_id();
        let p = self.prefix.as_str();
        match command {
            Command::Ask(text) if text.is_empty() => reply::ask_usage(p),
            Command::Ask(text) => {
                self.typing(message).await;
                match self
                    .orchestrator
                    .complete_for(&user, &text, message.user.display_name())
                    .await
                {
                    Ok(answer) => answer,
                    Err(e) => completion_failure(&user, &e, reply::INFERENCE_FAILED),
                }
            }
            Command::Reset => match self.sessions().reset(&user).await {
                Ok(()) => reply::RESET_DONE.to_string(),
                Err(e) => storage_failure(&user, &e),
            },
            Command::Personality(action) => self.personality(&user, action).await,
            Command::Memory(action) => self.memory(&user, action).await,
            Command::Slap(target) => {
                let target = self.slap_target(target).await;
                self.typing(message).await;
                match self
                    .orchestrator
                    .slap(&user, &target, message.user.display_name())
                    .await
                {
                    Ok(reaction) => reaction,
                    Err(e) => completion_failure(&user, &e, reply::SLAP_FALLBACK),
                }
            }
            Command::Help => reply::help_text(p),
            Command::Unknown(name) => reply::unknown_command(&name, p),
        }
    }

    async fn personality(&self, user: &UserId, action: PersonalityAction) -> String {
        let p = self.prefix.as_str();
        match action {
            PersonalityAction::Missing => reply::personality_subcommand_missing(),
            PersonalityAction::Unknown(sub) => reply::personality_subcommand_unknown(&sub),
            PersonalityAction::List => reply::personality_list(self.sessions().catalog()),
            PersonalityAction::Set(None) => reply::personality_name_missing(p),
            PersonalityAction::Set(Some(name)) => {
                match self.sessions().set_personality(user, &name).await {
                    Ok(profile) => reply::personality_set(&profile),
                    Err(SessionError::PersonalityNotFound(nf)) => {
                        reply::personality_unknown(&nf.name, p)
                    }
                    Err(SessionError::Storage(e)) => storage_failure(user, &e),
                }
            }
            PersonalityAction::Current => match self.sessions().active_personality(user).await {
                Ok(profile) => reply::personality_current(&profile),
                Err(e) => storage_failure(user, &e),
            },
        }
    }

    async fn memory(&self, user: &UserId, action: MemoryAction) -> String {
        match action {
            MemoryAction::Missing => reply::memory_subcommand_missing(),
            MemoryAction::Unknown(sub) => reply::memory_subcommand_unknown(&sub),
            MemoryAction::View => match self.sessions().history(user).await {
                Ok(turns) if turns.is_empty() => reply::memory_empty(&self.prefix),
                Ok(turns) => {
                    let messages: Vec<_> = turns.iter().map(turn_to_chat_message).collect();
                    reply::memory_view(&format_transcript(&messages))
                }
                Err(e) => storage_failure(user, &e),
            },
            MemoryAction::Delete => match self.sessions().delete_user_data(user).await {
                Ok(()) => reply::MEMORY_DELETED.to_string(),
                Err(e) => storage_failure(user, &e),
            },
        }
    }

    /// `me` when no target is given or the target is this bot.
    async fn slap_target(&self, target: Option<String>) -> String {
        let Some(target) = target else {
            return "me".to_string();
        };
        match self.bot_username.read().await.as_deref() {
            Some(username) if is_bot_mentioned(&target, username) => "me".to_string(),
            _ => target,
        }
    }

    async fn send_reply(&self, message: &Message, text: &str) -> Result<()> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            self.bot.reply_to(message, &chunk).await?;
        }
        Ok(())
    }
}

fn storage_failure(user: &UserId, e: &memory::StorageError) -> String {
    error!(user_id = %user, error = %e, "Storage operation failed");
    reply::STORAGE_FAILED.to_string()
}

fn completion_failure(user: &UserId, e: &CompletionError, inference_reply: &str) -> String {
    match e {
        CompletionError::Inference(inner) => {
            error!(user_id = %user, error = %inner, "Completion failed");
            inference_reply.to_string()
        }
        CompletionError::Storage(inner) => storage_failure(user, inner),
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let bot_username = self.bot_username.read().await.clone();
        let Some(command) = parse_message(message, &self.prefix, bot_username.as_deref()) else {
            return Ok(HandlerResponse::Ignore);
        };
        info!(user_id = message.user.id, command = ?command, "Command received");

        let text = self.execute(command, message).await;
        self.send_reply(message, &text).await?;
        Ok(HandlerResponse::Reply(text))
    }
}
