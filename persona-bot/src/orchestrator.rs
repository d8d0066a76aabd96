//! # Completion orchestrator
//!
//! Turns a user message into a model reply: session snapshot → prompt → inference → record.
//!
//! The inference call runs without the user's lock held. Exactly one request is made per call; on
//! failure nothing is recorded and the error is returned as is, so a caller retry can never leave
//! a duplicated user turn behind.

use llm_client::LlmClient;
use memory::{Role, Turn, UserId};
use prompt::{build_messages, format_system_message, ChatMessage};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::core::CompletionError;
use crate::session::SessionManager;

/// Appended to the personality prompt for `slap` reactions.
const SLAP_NOTE: &str = "The user just slapped you playfully. React in-character with escalating \
tone based on how many times they've done it.";

/// Maps a stored turn to a prompt message with the same role.
pub fn turn_to_chat_message(turn: &Turn) -> ChatMessage {
    match turn.role {
        Role::User => ChatMessage::user(turn.content.clone()),
        Role::Assistant => ChatMessage::assistant(turn.content.clone()),
    }
}

pub struct CompletionOrchestrator {
    sessions: Arc<SessionManager>,
    llm: Arc<dyn LlmClient>,
}

impl CompletionOrchestrator {
    pub fn new(sessions: Arc<SessionManager>, llm: Arc<dyn LlmClient>) -> Self {
        Self { sessions, llm }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Reply to `text` with the user's active personality and context.
    pub async fn complete(&self, user: &UserId, text: &str) -> Result<String, CompletionError> {
        self.complete_for(user, text, None).await
    }

    /// Like [`complete`](Self::complete); `username` is mentioned in the system message when known.
    #[instrument(skip(self, text, username), fields(user_id = %user, text_len = text.len()))]
    pub async fn complete_for(
        &self,
        user: &UserId,
        text: &str,
        username: Option<&str>,
    ) -> Result<String, CompletionError> {
        let (personality, context) = self.sessions.snapshot(user).await?;
        let user_turn = Turn::user(text);

        let system = format_system_message(
            &personality.display_name,
            &personality.system_prompt,
            username,
        );
        let messages = build_messages(&system, context.iter().map(turn_to_chat_message), text);
        info!(
            user_id = %user,
            personality = %personality.name,
            context_turns = context.len(),
            message_count = messages.len(),
            "Requesting completion"
        );

        let reply = self
            .llm
            .complete(messages, &personality.params)
            .await
            .map_err(|e| {
                warn!(user_id = %user, error = %e, "Inference failed, nothing recorded");
                e
            })?;

        self.sessions
            .record_exchange(user, user_turn, Turn::assistant(reply.clone()))
            .await?;
        info!(user_id = %user, reply_len = reply.len(), "Completion recorded");
        Ok(reply)
    }

    /// In-character reaction to being slapped. Bumps the slap counter; conversation memory is untouched.
    #[instrument(skip(self, target, username), fields(user_id = %user))]
    pub async fn slap(
        &self,
        user: &UserId,
        target: &str,
        username: Option<&str>,
    ) -> Result<String, CompletionError> {
        let count = self.sessions.record_slap(user).await?;
        let personality = self.sessions.active_personality(user).await?;

        let prompt = format!(
            "{}\n\n{} They have slapped you {} time(s).",
            personality.system_prompt.trim(),
            SLAP_NOTE,
            count
        );
        let system = format_system_message(&personality.display_name, &prompt, username);
        let messages = build_messages(&system, Vec::new(), &format!("*slaps {}*", target));
        info!(user_id = %user, slap_count = count, personality = %personality.name, "Requesting slap reaction");

        Ok(self.llm.complete(messages, &personality.params).await?)
    }
}
