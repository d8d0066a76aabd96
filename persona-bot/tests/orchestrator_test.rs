//! Integration tests for [`persona_bot::CompletionOrchestrator`].
//!
//! Covers: prompt order (system, history, current), personality parameters reaching the model,
//! nothing recorded on inference failure, slap reactions leaving memory untouched, the user's
//! session staying usable while inference runs, and storage failures surfacing as typed errors.
//! The LLM is a scripted [`common::MockLlm`] unless a test needs to call back into the session.

mod common;

use async_trait::async_trait;
use common::{orchestrator, orchestrator_with, sessions, FailingStore};
use llm_client::{GenerationParams, InferenceError, LlmClient};
use memory::{ContextWindow, StorageError, UserId};
use persona_bot::{CompletionError, CompletionOrchestrator, SessionConfig, SessionManager};
use prompt::{ChatMessage, MessageRole};
use std::sync::Arc;
use std::time::Duration;

/// **Test: the request is system message, windowed history, then the new user message.**
///
/// **Setup:** window of 2 turns; one prior exchange; pirate personality.
/// **Action:** `complete_for(user, "where is the treasure?", Some("Ann"))`.
/// **Expected:** [system, user "hi", assistant "reply to: hi", user "where is the treasure?"];
/// system names the personality and the user; temperature is the pirate's.
#[tokio::test]
async fn test_prompt_order_and_system_message() {
    let (orchestrator, llm) = orchestrator(SessionConfig {
        context_window: ContextWindow::turns(2),
        ..SessionConfig::default()
    });
    let user = UserId::from(1);
    orchestrator
        .sessions()
        .set_personality(&user, "pirate")
        .await
        .unwrap();
    orchestrator.complete(&user, "hi").await.unwrap();

    let reply = orchestrator
        .complete_for(&user, "where is the treasure?", Some("Ann"))
        .await
        .unwrap();
    assert_eq!(reply, "reply to: where is the treasure?");

    let requests = llm.requests();
    let (messages, params) = &requests[1];
    let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::System,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User
        ]
    );
    assert!(messages[0].content.starts_with("Personality: Pirate Captain\n\n"));
    assert!(messages[0].content.contains("pirate speak"));
    assert!(messages[0].content.contains("named Ann"));
    assert_eq!(messages[1].content, "hi");
    assert_eq!(messages[3].content, "where is the treasure?");
    assert_eq!(params.temperature, 0.9);
}

/// **Test: a successful completion records the user turn then the assistant turn.**
#[tokio::test]
async fn test_success_records_exchange() {
    let (orchestrator, _llm) = orchestrator(SessionConfig::default());
    let user = UserId::from(1);

    orchestrator.complete(&user, "hello").await.unwrap();

    let history = orchestrator.sessions().history(&user).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "hello");
    assert_eq!(history[1].content, "reply to: hello");
}

/// **Test: an inference failure is returned and nothing is recorded.**
#[tokio::test]
async fn test_failure_records_nothing() {
    let (orchestrator, llm) = orchestrator(SessionConfig::default());
    let user = UserId::from(1);
    llm.push(Err(InferenceError::Timeout(60)));

    let err = orchestrator.complete(&user, "hello").await.unwrap_err();

    assert!(matches!(
        err,
        CompletionError::Inference(InferenceError::Timeout(60))
    ));
    assert_eq!(llm.request_count(), 1);
    assert!(orchestrator.sessions().history(&user).await.unwrap().is_empty());
}

/// **Test: slap reactions bump the counter and never touch conversation memory.**
#[tokio::test]
async fn test_slap_leaves_memory_untouched() {
    let (orchestrator, llm) = orchestrator(SessionConfig::default());
    let user = UserId::from(1);
    orchestrator.complete(&user, "hello").await.unwrap();

    orchestrator.slap(&user, "me", None).await.unwrap();
    let reaction = orchestrator.slap(&user, "the cat", None).await.unwrap();
    assert_eq!(reaction, "reply to: *slaps the cat*");

    let requests = llm.requests();
    let (messages, _) = &requests[2];
    assert_eq!(messages.len(), 2);
    assert!(messages[0].content.contains("2 time(s)"));
    assert_eq!(orchestrator.sessions().history(&user).await.unwrap().len(), 2);
}

/// LLM double that uses the same user's session while "generating".
struct SessionTouchingLlm {
    sessions: Arc<SessionManager>,
    user: UserId,
}

#[async_trait]
impl LlmClient for SessionTouchingLlm {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        let context = tokio::time::timeout(Duration::from_secs(2), self.sessions.get_context(&self.user))
            .await
            .map_err(|_| InferenceError::Timeout(2))?
            .map_err(|e| InferenceError::Request(e.to_string()))?;
        tokio::time::timeout(Duration::from_secs(2), self.sessions.active_personality(&self.user))
            .await
            .map_err(|_| InferenceError::Timeout(2))?
            .map_err(|e| InferenceError::Request(e.to_string()))?;
        Ok(format!("seen {} turns", context.len()))
    }
}

/// **Test: the user's session stays usable while the model call is in flight.**
///
/// **Setup:** an LLM double that reads the same user's context and personality inside `complete`.
/// **Action:** `complete(user, ..)` twice, bounded by a timeout.
/// **Expected:** both succeed; the second call sees the first exchange.
#[tokio::test]
async fn test_inference_runs_without_user_lock() {
    let sessions = sessions(SessionConfig::default());
    let user = UserId::from(1);
    let llm = Arc::new(SessionTouchingLlm {
        sessions: sessions.clone(),
        user: user.clone(),
    });
    let orchestrator = CompletionOrchestrator::new(sessions.clone(), llm);

    let first = tokio::time::timeout(Duration::from_secs(5), orchestrator.complete(&user, "hi"))
        .await
        .expect("completion must not deadlock on the user's lock");
    assert_eq!(first.unwrap(), "seen 0 turns");

    let second = tokio::time::timeout(Duration::from_secs(5), orchestrator.complete(&user, "again"))
        .await
        .expect("completion must not deadlock on the user's lock");
    assert_eq!(second.unwrap(), "seen 2 turns");
    assert_eq!(sessions.history(&user).await.unwrap().len(), 4);
}

/// **Test: a failed write after a successful inference surfaces as Storage and stores nothing.**
#[tokio::test]
async fn test_record_failure_leaves_history_unchanged() {
    let store = Arc::new(FailingStore::new());
    let (orchestrator, llm) = orchestrator_with(store.clone(), SessionConfig::default());
    let user = UserId::from(1);
    orchestrator.complete(&user, "first").await.unwrap();

    store.fail_writes(true);
    let err = orchestrator.complete(&user, "second").await.unwrap_err();

    assert!(matches!(err, CompletionError::Storage(StorageError::Corrupt(_))));
    assert_eq!(llm.request_count(), 2);
    let stored = store.stored(&user).await;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].content, "first");
}

/// **Test: a failed read before inference surfaces as Storage and the model is never called.**
#[tokio::test]
async fn test_snapshot_failure_skips_inference() {
    let store = Arc::new(FailingStore::new());
    let (orchestrator, llm) = orchestrator_with(store.clone(), SessionConfig::default());
    store.fail_reads(true);

    let err = orchestrator
        .complete(&UserId::from(1), "hello")
        .await
        .unwrap_err();

    assert!(matches!(err, CompletionError::Storage(_)));
    assert_eq!(llm.request_count(), 0);
}
