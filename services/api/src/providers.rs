//! Downstream providers: hosted LLM chat completions and image inference
//!
//! Calls are made once per request with a request timeout and no retries.

use thiserror::Error;

pub mod inference;
pub mod llm;

pub use inference::{HttpClassifier, ImageClassifier, ImageFormat, InferenceConfig, Prediction};
pub use llm::{ChatMessage, ChatProvider, CompletionRequest, GroqClient, LlmConfig, Role};

/// Downstream provider failure
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Request could not be sent or the response body could not be read
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Provider answered without any content
    #[error("Provider returned an empty response")]
    EmptyResponse,

    /// Provider answer did not match the expected shape
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Turn a non-success response into [`ProviderError::Status`], keeping a short body excerpt
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body: body.chars().take(200).collect(),
    })
}
