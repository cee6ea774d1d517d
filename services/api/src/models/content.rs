//! Chat log, document and AI payload models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One chat exchange in a user's log
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub response: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New chat log entry
#[derive(Debug, Clone)]
pub struct NewChatEntry {
    pub user_id: Uuid,
    pub content: String,
    pub response: Option<String>,
}

/// Uploaded document record
#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub stored_path: String,
    pub content: String,
    pub file_type: String,
    pub file_size: i64,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New document record
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: Uuid,
    pub filename: String,
    pub stored_path: String,
    pub content: String,
    pub file_type: String,
    pub file_size: i64,
    pub summary: Option<String>,
}

/// Response for document operations
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            filename: document.filename,
            file_type: document.file_type,
            file_size: document.file_size,
            summary: document.summary,
            created_at: document.created_at,
        }
    }
}

/// Request for the chat endpoint
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub content: String,
    #[serde(default)]
    pub context: Option<String>,
}

/// Response for the chat endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub chat_id: Uuid,
}

/// Limit for the chat history listing
#[derive(Debug, Deserialize, Default)]
pub struct ChatHistoryQuery {
    pub limit: Option<i64>,
}

/// Request for text summarization
#[derive(Debug, Deserialize)]
pub struct SummarizationRequest {
    pub text: String,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
}

/// Response for text summarization
#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizationResponse {
    pub summary: String,
    pub original_length: usize,
    pub summary_length: usize,
}

/// Length bounds for summarizing an uploaded file
#[derive(Debug, Deserialize, Default)]
pub struct SummarizeFileQuery {
    pub max_length: Option<u32>,
    pub min_length: Option<u32>,
}

/// Response for file summarization
#[derive(Debug, Serialize, Deserialize)]
pub struct FileSummaryResponse {
    pub document_id: Uuid,
    pub filename: String,
    pub summary: String,
    pub original_length: usize,
    pub summary_length: usize,
}

/// Base64-encoded image payload
#[derive(Debug, Deserialize)]
pub struct ImageData {
    pub image_data: String,
}

/// Response for image classification
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_class: String,
    pub confidence: f32,
}

/// Response for the upload endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub document: DocumentResponse,
    pub content_type: Option<String>,
}
