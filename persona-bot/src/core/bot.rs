//! Bot abstraction for sending messages.
//!
//! [`Bot`] is transport-agnostic; the Telegram implementation lives in `crate::telegram`.

use async_trait::async_trait;

use super::error::Result;
use super::types::{Chat, Message};

/// Outbound side of a transport. Tests substitute an in-memory implementation.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Sends a reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()>;
    /// Shows a "typing" indicator in the chat while a reply is generated.
    async fn send_typing(&self, chat: &Chat) -> Result<()>;
}
