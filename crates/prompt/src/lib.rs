//! # Prompt
//!
//! Assembles the ordered message sequence sent to a chat-completion model.
//!
//! ## Format
//!
//! - **System**: `Personality: {display name}` header, blank line, the personality prompt, and an
//!   optional line naming the current user.
//! - **History**: prior turns, oldest first, with their original roles.
//! - **Current**: the new user message, always last.
//!
//! ## External interactions
//!
//! - **AI models**: output is sent to OpenAI-compatible `/chat/completions` endpoints.

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Builds the system message for a personality.
///
/// `username`, when known, is appended so the model can address the user by name.
pub fn format_system_message(
    display_name: &str,
    system_prompt: &str,
    username: Option<&str>,
) -> String {
    let mut out = format!("Personality: {}\n\n{}", display_name, system_prompt.trim());
    if let Some(name) = username.map(str::trim).filter(|n| !n.is_empty()) {
        out.push_str("\n\nThe current user you're talking to is named ");
        out.push_str(name);
        out.push('.');
    }
    out
}

/// Builds `[system] + history + [user(current)]`.
///
/// System messages found in `history` are dropped so exactly one system message leads the sequence.
pub fn build_messages<I>(system_message: &str, history: I, current: &str) -> Vec<ChatMessage>
where
    I: IntoIterator<Item = ChatMessage>,
{
    let mut messages = vec![ChatMessage::system(system_message)];
    messages.extend(
        history
            .into_iter()
            .filter(|m| m.role != MessageRole::System),
    );
    messages.push(ChatMessage::user(current));
    messages
}

/// Renders a conversation for people to read: `You: ...` / `Bot: ...` paragraphs. System messages are skipped.
pub fn format_transcript<'a, I>(messages: I) -> String
where
    I: IntoIterator<Item = &'a ChatMessage>,
{
    messages
        .into_iter()
        .filter_map(|m| match m.role {
            MessageRole::User => Some(format!("You: {}", m.content)),
            MessageRole::Assistant => Some(format!("Bot: {}", m.content)),
            MessageRole::System => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
