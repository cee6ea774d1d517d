//! Chat and summarization on top of a [`ChatProvider`]
//!
//! Every call is a single turn: a system prompt, optional extra context and
//! the user text. Logged history is never replayed to the provider.

use crate::providers::{ChatMessage, ChatProvider, CompletionRequest, ProviderError};

const CHAT_SYSTEM_PROMPT: &str = "You are a helpful assistant for a text summarization application. \
You can help users with their questions and provide information about text processing.";

const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that creates concise and accurate summaries of text.";

/// Default minimum summary length in words
pub const DEFAULT_MIN_LENGTH: u32 = 30;
/// Default maximum summary length in words
pub const DEFAULT_MAX_LENGTH: u32 = 150;

/// Build the messages for a chat turn
pub fn chat_messages(user_message: &str, context: Option<&str>) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(CHAT_SYSTEM_PROMPT)];

    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        messages.push(ChatMessage::system(format!(
            "Additional context: {}",
            context
        )));
    }

    messages.push(ChatMessage::user(user_message));
    messages
}

/// Build the user prompt for a summary, with an optional word-count instruction
pub fn summary_prompt(text: &str, min_length: Option<u32>, max_length: Option<u32>) -> String {
    let prompt = format!(
        "Please provide a concise summary of the following text:\n\n{}\n\nSummary:",
        text
    );

    let length_instruction = match (min_length, max_length) {
        (Some(min), Some(max)) => format!("at least {} words and at most {} words", min, max),
        (Some(min), None) => format!("at least {} words", min),
        (None, Some(max)) => format!("at most {} words", max),
        (None, None) => return prompt,
    };

    format!("The summary should be {}. {}", length_instruction, prompt)
}

/// Number of whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Ask the provider for a chat reply
pub async fn chat(
    provider: &dyn ChatProvider,
    user_message: &str,
    context: Option<&str>,
) -> Result<String, ProviderError> {
    provider
        .complete(CompletionRequest {
            messages: chat_messages(user_message, context),
            temperature: 0.7,
        })
        .await
}

/// Ask the provider for a summary
pub async fn summarize(
    provider: &dyn ChatProvider,
    text: &str,
    min_length: Option<u32>,
    max_length: Option<u32>,
) -> Result<String, ProviderError> {
    provider
        .complete(CompletionRequest {
            messages: vec![
                ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
                ChatMessage::user(summary_prompt(text, min_length, max_length)),
            ],
            temperature: 0.3,
        })
        .await
}
