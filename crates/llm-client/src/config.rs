//! LLM configuration: trait and env-based implementation.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::GenerationParams;

/// LLM configuration interface for OpenAI-compatible inference servers.
pub trait LlmConfig: Send + Sync {
    fn base_url(&self) -> &str;
    fn model(&self) -> &str;
    /// Local servers usually accept any key; `None` when unset.
    fn api_key(&self) -> Option<&str>;
    fn timeout(&self) -> Duration;
    fn generation_params(&self) -> GenerationParams;
}

/// LLM config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvLlmConfig {
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub llm_timeout_secs: u64,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
}

impl LlmConfig for EnvLlmConfig {
    fn base_url(&self) -> &str {
        &self.llm_api_url
    }
    fn model(&self) -> &str {
        &self.llm_model
    }
    fn api_key(&self) -> Option<&str> {
        self.llm_api_key.as_deref()
    }
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
    fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.llm_temperature,
            max_tokens: self.llm_max_tokens,
        }
    }
}

impl Default for EnvLlmConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            llm_api_url: "http://localhost:1234/v1".to_string(),
            llm_model: "local-model".to_string(),
            llm_api_key: None,
            llm_timeout_secs: 60,
            llm_temperature: params.temperature,
            llm_max_tokens: params.max_tokens,
        }
    }
}

impl EnvLlmConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let llm_api_url = env::var("LLM_API_URL")
            .or_else(|_| env::var("LM_STUDIO_API_URL"))
            .unwrap_or(defaults.llm_api_url);
        let llm_model = env::var("LLM_MODEL").unwrap_or(defaults.llm_model);
        let llm_api_key = env::var("LLM_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let llm_timeout_secs = match env::var("LLM_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("LLM_TIMEOUT_SECS is invalid: {}", raw))?,
            Err(_) => defaults.llm_timeout_secs,
        };
        if llm_timeout_secs == 0 {
            anyhow::bail!("LLM_TIMEOUT_SECS must be at least 1");
        }
        let llm_temperature = match env::var("LLM_TEMPERATURE") {
            Ok(raw) => raw
                .trim()
                .parse::<f32>()
                .with_context(|| format!("LLM_TEMPERATURE is invalid: {}", raw))?,
            Err(_) => defaults.llm_temperature,
        };
        let llm_max_tokens = match env::var("LLM_MAX_TOKENS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("LLM_MAX_TOKENS is invalid: {}", raw))?,
            Err(_) => defaults.llm_max_tokens,
        };
        Ok(Self {
            llm_api_url,
            llm_model,
            llm_api_key,
            llm_timeout_secs,
            llm_temperature,
            llm_max_tokens,
        })
    }
}
