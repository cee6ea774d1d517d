//! Document upload endpoints

use axum::{
    Extension, Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    extract::read_file_field,
    files::{decode_text, extension, sanitize_filename, save_file, validate_upload},
    middleware::AuthUser,
    models::{Document, DocumentResponse, NewDocument, UploadResponse},
    state::AppState,
};

/// A multipart `file` field whose name, size and extension passed validation
pub(super) struct ValidUpload {
    pub filename: String,
    pub file_type: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Read the `file` field and check it against the upload rules
pub(super) async fn read_upload(
    state: &AppState,
    multipart: &mut Multipart,
) -> ApiResult<ValidUpload> {
    let file = read_file_field(multipart, "file")
        .await?
        .ok_or_else(|| ApiError::BadRequest("Missing file field".to_string()))?;

    let filename = file
        .file_name
        .as_deref()
        .and_then(sanitize_filename)
        .ok_or_else(|| ApiError::BadRequest("Missing file name".to_string()))?;

    validate_upload(&filename, file.bytes.len(), state.config.upload.max_file_size)
        .map_err(ApiError::BadRequest)?;

    Ok(ValidUpload {
        file_type: extension(&filename).unwrap_or_default(),
        filename,
        content_type: file.content_type,
        bytes: file.bytes,
    })
}

/// Write the upload to disk and record it for the caller
pub(super) async fn store_upload(
    state: &AppState,
    user: &AuthUser,
    upload: &ValidUpload,
    summary: Option<String>,
) -> ApiResult<Document> {
    let stored_path = save_file(&state.config.upload.upload_dir, &upload.filename, &upload.bytes)
        .await
        .map_err(|e| {
            error!("Failed to store upload {}: {}", upload.filename, e);
            ApiError::InternalServerError
        })?;

    // Only plain text is extracted; binary types keep an empty content
    let content = if upload.file_type == "txt" {
        decode_text(&upload.bytes)
    } else {
        String::new()
    };

    let document = state
        .documents
        .create(&NewDocument {
            user_id: user.user_id,
            filename: upload.filename.clone(),
            stored_path: stored_path.to_string_lossy().into_owned(),
            content,
            file_type: upload.file_type.clone(),
            file_size: upload.bytes.len() as i64,
            summary,
        })
        .await?;

    info!(user = %user.username, document = %document.id, "Document stored");

    Ok(document)
}

/// Store an uploaded file and record it for the caller
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let mut multipart = multipart?;

    let upload = read_upload(&state, &mut multipart).await?;
    let document = store_upload(&state, &user, &upload, None).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            document: DocumentResponse::from(document),
            content_type: upload.content_type,
        }),
    ))
}

/// Documents uploaded by the caller
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<DocumentResponse>>> {
    let documents = state.documents.list_for_user(user.user_id).await?;

    Ok(Json(
        documents.into_iter().map(DocumentResponse::from).collect(),
    ))
}
