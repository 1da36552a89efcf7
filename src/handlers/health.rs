use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};
use serde_json::json;

/// Health check endpoint
/// Returns 200 OK if the service is running
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "service": "decor-analyzer",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Upload form
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
