//! API service routes

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{middleware::auth_middleware, state::AppState};

pub mod ai;
pub mod auth;
pub mod health;
pub mod predict;
pub mod upload;
pub mod users;

/// Room for multipart boundaries and headers on top of the file size limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Body limit for a file of `max_file_size` bytes sent as base64 in JSON
pub fn base64_body_limit(max_file_size: usize) -> usize {
    max_file_size.div_ceil(3) * 4 + MULTIPART_OVERHEAD
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let max_file_size = state.config.upload.max_file_size;
    let body_limit = max_file_size + MULTIPART_OVERHEAD;

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/users/", get(users::list_users))
        .route("/users/count", get(users::count_users))
        .route("/users/:id", get(users::get_user))
        .route("/chat/", post(ai::chat))
        .route("/chat/history", get(ai::chat_history))
        .route("/summarize/", post(ai::summarize))
        .route("/summarize/file", post(ai::summarize_file))
        .route(
            "/predict/",
            post(predict::predict)
                .layer(DefaultBodyLimit::max(base64_body_limit(max_file_size))),
        )
        .route("/upload/", post(upload::upload_file))
        .route("/documents/", get(upload::list_documents))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health_check))
        .route("/health/status", get(health::status))
        .route("/auth/", post(auth::register))
        .route("/auth/token", post(auth::login))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
