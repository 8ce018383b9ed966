/*
 * Responsibility
 * - GET /health (疎通用)
 * - AUTH_EXCLUDE_PATHS で認証を外す想定
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
