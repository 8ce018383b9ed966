use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use crate::services::auth::{Session, session_from_extensions};
use crate::state::AppState;

/// Handler で Session を受け取るための extractor
///
/// middleware が VerifiedClaims を request.extensions() に insert 済みである前提。
/// 見つからない / identity が不正な場合は 401 を返す (debug 時は原因も本文に含める)。
pub struct CurrentSession(pub Session);

impl FromRequestParts<AppState> for CurrentSession
where
    AppState: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_from_extensions(&parts.extensions)
            .map(CurrentSession)
            .map_err(|err| {
                let message = err.client_message(state.auth.config().debug);
                (err.status(), message).into_response()
            })
    }
}
