//! Conversions from teloxide types to core types.

use crate::core::{Chat, Message, ToCoreMessage, ToCoreUser, User};

/// Telegram user → core user.
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Telegram message → core message. `bot_id` marks replies to the bot's own messages.
pub struct TelegramMessageWrapper<'a> {
    pub message: &'a teloxide::types::Message,
    pub bot_id: Option<teloxide::types::UserId>,
}

impl<'a> TelegramMessageWrapper<'a> {
    pub fn new(
        message: &'a teloxide::types::Message,
        bot_id: Option<teloxide::types::UserId>,
    ) -> Self {
        Self { message, bot_id }
    }

    fn reply_to_bot(&self) -> bool {
        let author = self
            .message
            .reply_to_message()
            .and_then(|m| m.from.as_ref());
        match (author, self.bot_id) {
            (Some(author), Some(bot_id)) => author.id == bot_id,
            _ => false,
        }
    }
}

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        let msg = self.message;
        Message {
            id: msg.id.to_string(),
            user: msg
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or_else(|| User {
                    id: msg.chat.id.0,
                    username: None,
                    first_name: None,
                    last_name: None,
                }),
            chat: Chat {
                id: msg.chat.id.0,
                chat_type: if msg.chat.is_private() {
                    "private".to_string()
                } else {
                    "group".to_string()
                },
            },
            content: msg.text().unwrap_or("").to_string(),
            created_at: msg.date,
            reply_to_message_id: msg.reply_to_message().map(|m| m.id.to_string()),
            reply_to_message_from_bot: self.reply_to_bot(),
        }
    }
}
