//! Chat completion client for an OpenAI-compatible LLM API (Groq by default)

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{ProviderError, ensure_success};

/// LLM provider configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key sent as a bearer token
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Maximum tokens per completion
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl LlmConfig {
    /// Create a new LlmConfig from environment variables
    ///
    /// Returns `None` when no API key is configured, which disables the
    /// chat and summarization endpoints.
    ///
    /// # Environment Variables
    /// - `GROQ_API_KEY`: API key (default: empty, provider disabled)
    /// - `LLM_BASE_URL`: API base URL (default: https://api.groq.com/openai/v1)
    /// - `LLM_MODEL`: Model name (default: llama3-8b-8192)
    /// - `LLM_MAX_TOKENS`: Completion token limit (default: 1000)
    /// - `LLM_TIMEOUT_SECONDS`: Request timeout (default: 60)
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GROQ_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return None;
        }

        let base_url = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());

        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "llama3-8b-8192".to_string());

        let max_tokens = std::env::var("LLM_MAX_TOKENS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .unwrap_or(1000);

        let timeout_seconds = std::env::var("LLM_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        Some(LlmConfig {
            api_key,
            base_url,
            model,
            max_tokens,
            timeout_seconds,
        })
    }
}

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One message of a completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Provider-independent completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// Chat completion provider
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Complete the conversation and return the trimmed assistant reply
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn into_content(self) -> Result<String, ProviderError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }
}

/// Groq chat completion client
#[derive(Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl GroqClient {
    /// Build a client with the configured request timeout
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        info!("LLM client initialized for model {}", config.model);
        Ok(Self { http, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatProvider for GroqClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        debug!(
            messages = request.messages.len(),
            model = %self.config.model,
            "Requesting chat completion"
        );

        let body = ChatCompletionBody {
            model: &self.config.model,
            messages: &request.messages,
            max_tokens: self.config.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let completion: ChatCompletionResponse = ensure_success(response).await?.json().await?;
        completion.into_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn request_body_uses_openai_wire_format() {
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let body = ChatCompletionBody {
            model: "llama3-8b-8192",
            messages: &messages,
            max_tokens: 1000,
            temperature: 0.7,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama3-8b-8192");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 1000);
    }

    #[test]
    fn first_choice_is_trimmed() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  Hello there \n"}}]}"#,
        )
        .unwrap();

        assert_eq!(response.into_content().unwrap(), "Hello there");
    }

    #[test]
    fn missing_choices_is_an_empty_response() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            response.into_content(),
            Err(ProviderError::EmptyResponse)
        ));

        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(
            response.into_content(),
            Err(ProviderError::EmptyResponse)
        ));
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let client = GroqClient::new(LlmConfig {
            api_key: "key".to_string(),
            base_url: "https://llm.example.com/v1/".to_string(),
            model: "m".to_string(),
            max_tokens: 10,
            timeout_seconds: 5,
        })
        .unwrap();

        assert_eq!(
            client.completions_url(),
            "https://llm.example.com/v1/chat/completions"
        );
    }

    #[test]
    #[serial]
    fn test_llm_config_disabled_without_key() {
        unsafe {
            std::env::remove_var("GROQ_API_KEY");
        }
        assert!(LlmConfig::from_env().is_none());

        unsafe {
            std::env::set_var("GROQ_API_KEY", "gsk_test");
            std::env::set_var("LLM_MAX_TOKENS", "256");
        }
        let config = LlmConfig::from_env().unwrap();
        assert_eq!(config.model, "llama3-8b-8192");
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.timeout_seconds, 60);

        unsafe {
            std::env::remove_var("GROQ_API_KEY");
            std::env::remove_var("LLM_MAX_TOKENS");
        }
    }
}
