//! Image classification endpoint

use axum::{
    Extension, Json,
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    extract::{ApiJson, read_file_field},
    middleware::AuthUser,
    models::{ImageData, PredictionResponse},
    providers::{ImageFormat, inference::decode_base64_image},
    state::AppState,
};

/// Classify an image sent as base64 JSON (`image_data`) or as multipart field `file`
pub async fn predict(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    request: Request,
) -> ApiResult<Json<PredictionResponse>> {
    let classifier = state.classifier.clone().ok_or_else(|| {
        ApiError::ServiceUnavailable("Prediction service not available".to_string())
    })?;

    let image = read_image(request, &state).await?;

    if image.len() > state.config.upload.max_file_size {
        return Err(ApiError::BadRequest(format!(
            "Image exceeds maximum allowed size of {} bytes",
            state.config.upload.max_file_size
        )));
    }

    let format = ImageFormat::sniff(&image)
        .ok_or_else(|| ApiError::BadRequest("Unsupported image format".to_string()))?;

    let prediction = classifier.classify(&image, format).await?;

    info!(
        user = %user.username,
        predicted_class = %prediction.label,
        "Image classified"
    );

    Ok(Json(PredictionResponse {
        predicted_class: prediction.label,
        confidence: prediction.confidence,
    }))
}

async fn read_image(request: Request, state: &AppState) -> ApiResult<Vec<u8>> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    if is_multipart {
        let mut multipart = Multipart::from_request(request, state).await?;
        let file = read_file_field(&mut multipart, "file")
            .await?
            .ok_or_else(|| ApiError::BadRequest("Missing file field".to_string()))?;
        return Ok(file.bytes);
    }

    let ApiJson(payload) = ApiJson::<ImageData>::from_request(request, state).await?;
    decode_base64_image(&payload.image_data).map_err(ApiError::BadRequest)
}
