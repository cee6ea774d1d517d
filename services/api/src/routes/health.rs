//! Index page and health endpoints

use axum::{
    Json,
    extract::State,
    response::{Html, IntoResponse},
};
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Index page
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let name = escape_html(&state.config.app_name);
    let version = escape_html(&state.config.app_version);

    Html(format!(
        r#"<!DOCTYPE html>
<html>
  <head><title>{name}</title></head>
  <body>
    <h1>{name}</h1>
    <p><strong>Version:</strong> {version}</p>
    <p><strong>Status:</strong> Running</p>
    <p><strong>Health Check:</strong> <a href="/health">Health Status</a></p>
  </body>
</html>
"#
    ))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "app_name": state.config.app_name,
        "version": state.config.app_version,
    }))
}

/// Application status and downstream availability
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let (backend, database) = match &state.db_pool {
        Some(pool) => (
            "postgresql",
            common::database::health_check(pool).await.unwrap_or(false),
        ),
        None => ("memory", true),
    };

    Json(json!({
        "app_name": state.config.app_name,
        "version": state.config.app_version,
        "debug": state.config.debug,
        "database_backend": backend,
        "services": {
            "ai_service": state.chat_provider.is_some(),
            "inference_service": state.classifier.is_some(),
            "database": database,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }
}
