/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証は app 側で Router 全体に掛ける (除外は AUTH_EXCLUDE_PATHS)
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{health::health, me::me};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/me", get(me))
}
