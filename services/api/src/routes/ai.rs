//! Chat and summarization endpoints backed by the LLM provider

use axum::{
    Extension, Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use std::sync::Arc;
use tracing::info;

use crate::{
    assistant,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiQuery},
    files::decode_text,
    middleware::AuthUser,
    models::{
        ChatEntry, ChatHistoryQuery, ChatRequest, ChatResponse, FileSummaryResponse,
        NewChatEntry, SummarizationRequest, SummarizationResponse, SummarizeFileQuery,
    },
    providers::ChatProvider,
    state::AppState,
    validation::require_text,
};

use super::upload::{read_upload, store_upload};

const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_HISTORY_LIMIT: i64 = 500;

fn summary_bounds(min_length: Option<u32>, max_length: Option<u32>) -> ApiResult<(u32, u32)> {
    let min_length = min_length.unwrap_or(assistant::DEFAULT_MIN_LENGTH);
    let max_length = max_length.unwrap_or(assistant::DEFAULT_MAX_LENGTH);

    if max_length == 0 || min_length > max_length {
        return Err(ApiError::BadRequest(
            "min_length must not exceed max_length, and max_length must be positive".to_string(),
        ));
    }

    Ok((min_length, max_length))
}

fn chat_provider(state: &AppState, service: &str) -> ApiResult<Arc<dyn ChatProvider>> {
    state
        .chat_provider
        .clone()
        .ok_or_else(|| ApiError::ServiceUnavailable(format!("{} service not available", service)))
}

/// Forward a message to the LLM and log the exchange
pub async fn chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let provider = chat_provider(&state, "Chat")?;
    require_text(&request.content, "Message").map_err(ApiError::BadRequest)?;

    info!(user = %user.username, "Chat request");

    let response =
        assistant::chat(provider.as_ref(), &request.content, request.context.as_deref()).await?;

    let entry = state
        .chat_log
        .append(&NewChatEntry {
            user_id: user.user_id,
            content: request.content,
            response: Some(response.clone()),
        })
        .await?;

    Ok(Json(ChatResponse {
        response,
        chat_id: entry.id,
    }))
}

/// The caller's chat log, newest first
pub async fn chat_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<ChatHistoryQuery>,
) -> ApiResult<Json<Vec<ChatEntry>>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_HISTORY_LIMIT
        )));
    }

    let entries = state.chat_log.list_for_user(user.user_id, limit).await?;

    Ok(Json(entries))
}

/// Summarize a text
pub async fn summarize(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<SummarizationRequest>,
) -> ApiResult<Json<SummarizationResponse>> {
    let provider = chat_provider(&state, "Summarization")?;
    require_text(&request.text, "Text").map_err(ApiError::BadRequest)?;

    let (min_length, max_length) = summary_bounds(request.min_length, request.max_length)?;

    info!(user = %user.username, words = assistant::word_count(&request.text), "Summarization request");

    let summary = assistant::summarize(
        provider.as_ref(),
        &request.text,
        Some(min_length),
        Some(max_length),
    )
    .await?;

    Ok(Json(SummarizationResponse {
        original_length: assistant::word_count(&request.text),
        summary_length: assistant::word_count(&summary),
        summary,
    }))
}

/// Summarize an uploaded text file and keep it with its summary
pub async fn summarize_file(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<SummarizeFileQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<FileSummaryResponse>> {
    let provider = chat_provider(&state, "Summarization")?;
    let (min_length, max_length) = summary_bounds(query.min_length, query.max_length)?;

    let mut multipart = multipart?;
    let upload = read_upload(&state, &mut multipart).await?;

    if upload.file_type != "txt" {
        return Err(ApiError::BadRequest(format!(
            "Text extraction is not supported for .{} files",
            upload.file_type
        )));
    }

    let text = decode_text(&upload.bytes);
    require_text(&text, "File content").map_err(ApiError::BadRequest)?;

    info!(user = %user.username, file = %upload.filename, "File summarization request");

    let summary = assistant::summarize(
        provider.as_ref(),
        &text,
        Some(min_length),
        Some(max_length),
    )
    .await?;

    let document = store_upload(&state, &user, &upload, Some(summary.clone())).await?;

    Ok(Json(FileSummaryResponse {
        document_id: document.id,
        filename: document.filename,
        original_length: assistant::word_count(&text),
        summary_length: assistant::word_count(&summary),
        summary,
    }))
}
