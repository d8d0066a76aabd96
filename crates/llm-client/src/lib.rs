//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait and an OpenAI-compatible implementation aimed at local
//! inference servers (LM Studio, llama.cpp server, Ollama's OpenAI endpoint).
//!
//! The client makes exactly one request per call. Retrying is left to callers, because a retried
//! completion that already produced side effects upstream would record duplicate turns.

use async_trait::async_trait;
use prompt::ChatMessage;
use thiserror::Error;

mod config;
mod openai_llm;

pub use config::{EnvLlmConfig, LlmConfig};
pub use openai_llm::OpenAILlmClient;

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Failure of a single inference call. No state is changed when one is returned.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Inference timed out after {0}s")]
    Timeout(u64),

    #[error("Inference request failed: {0}")]
    Request(String),

    #[error("Inference server returned an error: {0}")]
    Status(String),

    #[error("Inference server returned an empty response")]
    EmptyResponse,

    #[error("Invalid inference request: {0}")]
    InvalidRequest(String),
}

/// LLM client interface: one completion for an ordered message sequence.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the model reply text for `messages` (system first, newest user message last).
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        params: &GenerationParams,
    ) -> Result<String, InferenceError>;
}

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_ascii() {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..7], &token[len - 4..])
    }
}
