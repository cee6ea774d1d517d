//! Registration, login and current-user endpoints

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{error, info, warn};

use crate::{
    error::{ApiError, ApiResult},
    extract::{ApiForm, ApiJson},
    middleware::AuthUser,
    models::{CreateUserRequest, LoginForm, NewUser, TokenResponse, UserResponse},
    password::verify_password,
    state::AppState,
    validation::{validate_password, validate_username},
};

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_username(&payload.username).map_err(ApiError::BadRequest)?;
    validate_password(&payload.password).map_err(ApiError::BadRequest)?;

    info!("Registration request for user: {}", payload.username);

    let user = state
        .user_store
        .create(&NewUser {
            username: payload.username,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Exchange form-encoded credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    if let Some(grant_type) = form.grant_type.as_deref() {
        if !grant_type.is_empty() && grant_type != "password" {
            return Err(ApiError::BadRequest(format!(
                "Unsupported grant_type: {}",
                grant_type
            )));
        }
    }

    info!("Login attempt for user: {}", form.username);

    let user = state
        .user_store
        .find_by_username(&form.username)
        .await?
        .filter(|user| verify_password(&form.password, &user.password_hash))
        .ok_or_else(|| {
            warn!("Invalid credentials for user: {}", form.username);
            ApiError::Unauthorized
        })?;

    if !user.is_active {
        warn!("Login refused for inactive user: {}", user.username);
        return Err(ApiError::Unauthorized);
    }

    let access_token = state
        .jwt_service
        .issue(&user.username, user.id)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}

/// Current user resolved from the bearer token
pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_store
        .find_by_id(auth_user.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(UserResponse::from(user)))
}
