//! Shared test doubles: scripted LLM client, recording Bot, message builder.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use llm_client::{GenerationParams, InferenceError, LlmClient};
use memory::{InMemoryStore, MemoryStore, StorageError, StorageResult, Turn, UserId};
use persona_bot::{
    Bot as CoreBot, Chat, CompletionOrchestrator, Message, PersonalityCatalog, Result as BotResult,
    SessionConfig, SessionManager, User,
};
use prompt::ChatMessage;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// LLM double: returns queued results in order, then echoes `reply to: <last user message>`.
/// Records every request.
#[derive(Default)]
pub struct MockLlm {
    queued: Mutex<VecDeque<Result<String, InferenceError>>>,
    requests: Mutex<Vec<(Vec<ChatMessage>, GenerationParams)>>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, result: Result<String, InferenceError>) {
        self.queued.lock().unwrap().push_back(result);
    }

    pub fn requests(&self) -> Vec<(Vec<ChatMessage>, GenerationParams)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        let last = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.requests.lock().unwrap().push((messages, *params));
        match self.queued.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(format!("reply to: {}", last)),
        }
    }
}

/// Bot double: records replies and typing indicators, no network.
#[derive(Default)]
pub struct MockBot {
    pub replies: Mutex<Vec<String>>,
    pub typing: Mutex<usize>,
}

impl MockBot {
    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl CoreBot for MockBot {
    async fn send_message(&self, _chat: &Chat, text: &str) -> BotResult<()> {
        self.replies.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn reply_to(&self, _message: &Message, text: &str) -> BotResult<()> {
        self.replies.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_typing(&self, _chat: &Chat) -> BotResult<()> {
        *self.typing.lock().unwrap() += 1;
        Ok(())
    }
}

pub fn create_test_message(user_id: i64, content: &str) -> Message {
    Message {
        id: "test_message_id".to_string(),
        content: content.to_string(),
        user: User {
            id: user_id,
            username: Some("test_user".to_string()),
            first_name: Some("Test".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: 456,
            chat_type: "private".to_string(),
        },
        created_at: Utc::now(),
        reply_to_message_id: None,
        reply_to_message_from_bot: false,
    }
}

pub const PIRATE_CATALOG: &str = r#"
[[personality]]
name = "default"
display_name = "Default Assistant"
system_prompt = "You are a helpful assistant."

[[personality]]
name = "pirate"
display_name = "Pirate Captain"
system_prompt = "You are a pirate captain. Answer in pirate speak."
temperature = 0.9
"#;

pub fn pirate_catalog() -> Arc<PersonalityCatalog> {
    Arc::new(PersonalityCatalog::from_toml_str(PIRATE_CATALOG, GenerationParams::default()).unwrap())
}

pub fn sessions_with(
    store: Arc<dyn MemoryStore>,
    config: SessionConfig,
) -> Arc<SessionManager> {
    Arc::new(SessionManager::new(pirate_catalog(), store, config).unwrap())
}

pub fn sessions(config: SessionConfig) -> Arc<SessionManager> {
    sessions_with(Arc::new(InMemoryStore::new()), config)
}

pub fn orchestrator(
    config: SessionConfig,
) -> (Arc<CompletionOrchestrator>, Arc<MockLlm>) {
    let llm = Arc::new(MockLlm::new());
    let orchestrator = Arc::new(CompletionOrchestrator::new(sessions(config), llm.clone()));
    (orchestrator, llm)
}

/// Store double over [`InMemoryStore`] whose reads and writes can be made to fail independently.
#[derive(Default)]
pub struct FailingStore {
    inner: InMemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// What is actually stored, bypassing the failure switches.
    pub async fn stored(&self, user: &UserId) -> Vec<Turn> {
        self.inner.load(user).await.unwrap()
    }

    fn check(flag: &AtomicBool, op: &str) -> StorageResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StorageError::Corrupt(format!("{} failed", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl MemoryStore for FailingStore {
    async fn load(&self, user: &UserId) -> StorageResult<Vec<Turn>> {
        Self::check(&self.fail_reads, "load")?;
        self.inner.load(user).await
    }

    async fn append_many(
        &self,
        user: &UserId,
        turns: Vec<Turn>,
        retain_latest: Option<usize>,
    ) -> StorageResult<()> {
        Self::check(&self.fail_writes, "append")?;
        self.inner.append_many(user, turns, retain_latest).await
    }

    async fn clear(&self, user: &UserId) -> StorageResult<()> {
        Self::check(&self.fail_writes, "clear")?;
        self.inner.clear(user).await
    }

    async fn load_personality(&self, user: &UserId) -> StorageResult<Option<String>> {
        Self::check(&self.fail_reads, "load_personality")?;
        self.inner.load_personality(user).await
    }

    async fn save_personality(&self, user: &UserId, name: &str) -> StorageResult<()> {
        Self::check(&self.fail_writes, "save_personality")?;
        self.inner.save_personality(user, name).await
    }

    async fn increment_slaps(&self, user: &UserId) -> StorageResult<u32> {
        Self::check(&self.fail_writes, "increment_slaps")?;
        self.inner.increment_slaps(user).await
    }

    async fn purge(&self, user: &UserId) -> StorageResult<()> {
        Self::check(&self.fail_writes, "purge")?;
        self.inner.purge(user).await
    }
}

/// Orchestrator over `store` with a fresh [`MockLlm`].
pub fn orchestrator_with(
    store: Arc<dyn MemoryStore>,
    config: SessionConfig,
) -> (Arc<CompletionOrchestrator>, Arc<MockLlm>) {
    let llm = Arc::new(MockLlm::new());
    let orchestrator = Arc::new(CompletionOrchestrator::new(sessions_with(store, config), llm.clone()));
    (orchestrator, llm)
}
