/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: 認証 middleware (verifier + key source + options)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::middleware::auth::AuthMiddleware;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthMiddleware>,
}

impl AppState {
    pub fn new(auth: Arc<AuthMiddleware>) -> Self {
        Self { auth }
    }
}
