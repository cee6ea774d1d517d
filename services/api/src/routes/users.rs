//! User listing endpoints

use axum::{Json, extract::State};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    extract::{ApiPath, ApiQuery},
    models::{UserCountResponse, UserListQuery, UserResponse},
    state::AppState,
};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

/// List users with pagination
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let skip = query.skip.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    if skip < 0 {
        return Err(ApiError::BadRequest("skip must be zero or positive".to_string()));
    }

    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }

    let users = state.user_store.list(skip, limit).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Total number of users
pub async fn count_users(State(state): State<AppState>) -> ApiResult<Json<UserCountResponse>> {
    let total_users = state.user_store.count().await?;

    Ok(Json(UserCountResponse { total_users }))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}
