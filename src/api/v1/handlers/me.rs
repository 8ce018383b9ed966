/*
 * Responsibility
 * - GET /me: 認証済み caller の Session を返す
 */
use axum::Json;

use crate::api::v1::extractors::CurrentSession;
use crate::services::auth::Session;

pub async fn me(CurrentSession(session): CurrentSession) -> Json<Session> {
    Json(session)
}
