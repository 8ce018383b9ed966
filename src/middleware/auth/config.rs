/*
 * Responsibility
 * - 認証 middleware のオプション (error handler / 除外パス / debug)
 * - 起動時に一度だけ組み立てる。全フィールドに安全なデフォルトあり
 */
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};

/// Called with the rejected request and the client message; its response is returned as-is.
pub type ErrorHandler = Arc<dyn Fn(&Request<Body>, &str) -> Response + Send + Sync>;

/// `401 Unauthorized` with the message as a plain-text body.
pub fn default_error_handler() -> ErrorHandler {
    Arc::new(|_req, message| (StatusCode::UNAUTHORIZED, message.to_owned()).into_response())
}

#[derive(Clone)]
pub struct MiddlewareConfig {
    /// Invoked on every rejection cause.
    pub error_handler: ErrorHandler,
    /// Path prefixes that skip verification, checked in order.
    pub exclude_paths: Vec<String>,
    /// Append wrapped causes to rejection messages and log accepted requests.
    pub debug: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            error_handler: default_error_handler(),
            exclude_paths: Vec::new(),
            debug: false,
        }
    }
}

impl std::fmt::Debug for MiddlewareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareConfig")
            .field("exclude_paths", &self.exclude_paths)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl MiddlewareConfig {
    /// First configured prefix matching `path`.
    pub fn excluded_by(&self, path: &str) -> Option<&str> {
        self.exclude_paths
            .iter()
            .map(String::as_str)
            .find(|prefix| path.starts_with(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_exclusions_by_default() {
        let config = MiddlewareConfig::default();
        assert_eq!(config.excluded_by("/"), None);
        assert!(!config.debug);
    }

    #[test]
    fn first_matching_prefix_wins() {
        let config = MiddlewareConfig {
            exclude_paths: vec!["/api/v1/health".into(), "/api".into()],
            ..Default::default()
        };

        assert_eq!(config.excluded_by("/api/v1/health"), Some("/api/v1/health"));
        assert_eq!(config.excluded_by("/api/v1/me"), Some("/api"));
        assert_eq!(config.excluded_by("/me"), None);
    }

    #[test]
    fn default_handler_writes_401_message() {
        let handler = default_error_handler();
        let res = handler(&Request::new(Body::empty()), "nope");
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
