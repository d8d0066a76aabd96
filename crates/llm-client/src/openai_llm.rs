//! OpenAI-compatible [`LlmClient`] built on async-openai, bounded by a per-call timeout.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use prompt::{ChatMessage, MessageRole};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::LlmConfig;
use crate::{mask_token, GenerationParams, InferenceError, LlmClient};

/// Placeholder bearer key for servers that ignore authentication.
const UNUSED_API_KEY: &str = "not-needed";

/// async-openai client pointed at an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    timeout: Duration,
}

impl OpenAILlmClient {
    /// `base_url` is the API root (`http://localhost:1234/v1`); a full `.../chat/completions` URL
    /// is accepted too.
    pub fn new(base_url: &str, model: impl Into<String>, api_key: Option<&str>) -> Self {
        let api_base = normalize_base_url(base_url);
        let key = api_key.unwrap_or(UNUSED_API_KEY);
        info!(
            api_base = %api_base,
            api_key = %mask_token(key),
            "OpenAI-compatible client configured"
        );
        let config = OpenAIConfig::new()
            .with_api_key(key)
            .with_api_base(api_base);
        Self {
            client: Arc::new(Client::with_config(config)),
            model: model.into(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(config: &dyn LlmConfig) -> Self {
        Self::new(config.base_url(), config.model(), config.api_key())
            .with_timeout(config.timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .temperature(params.temperature)
            .max_tokens(params.max_tokens)
            .build()
            .map_err(map_openai_error)?;

        if let Ok(json) = serde_json::to_string(&request) {
            debug!(request_json = %json, "Chat completion request JSON");
        }

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        if let Some(ref u) = response.usage {
            info!(
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "Chat completion usage"
            );
        }

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            return Err(InferenceError::EmptyResponse);
        }
        Ok(content)
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, messages, params), fields(model = %self.model, message_count = messages.len()))]
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        if messages.is_empty() {
            return Err(InferenceError::InvalidRequest(
                "no messages to send".to_string(),
            ));
        }
        let openai_messages = messages
            .iter()
            .map(chat_message_to_openai)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            temperature = params.temperature,
            max_tokens = params.max_tokens,
            "Sending chat completion request"
        );
        match tokio::time::timeout(self.timeout, self.send(openai_messages, params)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Chat completion timed out");
                Err(InferenceError::Timeout(self.timeout.as_secs()))
            }
        }
    }
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage, InferenceError> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map_err(map_openai_error)?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(map_openai_error)?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(map_openai_error)?
            .into(),
    };
    Ok(openai_msg)
}

fn map_openai_error(err: OpenAIError) -> InferenceError {
    match err {
        OpenAIError::Reqwest(e) => match e.status() {
            Some(status) => InferenceError::Status(status.to_string()),
            None => InferenceError::Request(e.to_string()),
        },
        OpenAIError::ApiError(api) => InferenceError::Status(api.message),
        OpenAIError::JSONDeserialize(e) => {
            InferenceError::Status(format!("unreadable response body: {}", e))
        }
        OpenAIError::InvalidArgument(msg) => InferenceError::InvalidRequest(msg),
        other => InferenceError::Request(other.to_string()),
    }
}

fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/chat/completions")
        .unwrap_or(trimmed)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://localhost:1234/v1/chat/completions"),
            "http://localhost:1234/v1"
        );
        assert_eq!(normalize_base_url("http://localhost:1234/v1/"), "http://localhost:1234/v1");
        assert_eq!(normalize_base_url("http://localhost:1234/v1"), "http://localhost:1234/v1");
    }

    #[test]
    fn test_invalid_argument_maps_to_invalid_request() {
        let err = map_openai_error(OpenAIError::InvalidArgument("model missing".into()));
        assert!(matches!(err, InferenceError::InvalidRequest(m) if m == "model missing"));
    }
}
