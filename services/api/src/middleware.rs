//! Authentication middleware for bearer token validation

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::debug;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated caller resolved from a verified token
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub username: String,
    pub user_id: Uuid,
}

/// Authentication middleware
///
/// Verifies the bearer token on every request and stores the resolved
/// [`AuthUser`] in the request extensions. Every failure is the same 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;

    let user = state.jwt_service.verify(bearer.token()).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        ApiError::Unauthorized
    })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
