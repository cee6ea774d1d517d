//! Request extractors that report malformed input as 400 JSON errors

use axum::extract::{FromRequest, FromRequestParts, Multipart};

use crate::error::ApiError;

/// JSON body; syntax and shape errors become [`ApiError::BadRequest`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Form-encoded body; missing fields become [`ApiError::BadRequest`]
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(ApiError))]
pub struct ApiForm<T>(pub T);

/// Query string; invalid parameters become [`ApiError::BadRequest`]
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters; unparsable segments become [`ApiError::BadRequest`]
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// File part of a multipart request
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Read the first multipart field named `name`
pub async fn read_file_field(
    multipart: &mut Multipart,
    name: &str,
) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(name) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?.to_vec();

        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            bytes,
        }));
    }

    Ok(None)
}
