//! Bearer-token verification → `VerifiedClaims` in request extensions.
//!
//! Per request: `Unauthenticated -> Verifying -> {Authenticated, Rejected}`.
//! - excluded path: straight to the next handler, nothing attached
//! - verified: claims inserted into extensions, next handler runs
//! - rejected: configured error handler builds the response, next handler never runs
//!
//! If the request is dropped (timeout, client gone) while the key source is being
//! consulted, the future is dropped with it and nothing is attached.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::middleware::auth::config::MiddlewareConfig;
use crate::services::auth::{KeyResolver, TokenVerifier};
use crate::services::keys::KeySource;

/// Shared across all requests; carries no per-request state.
#[derive(Debug, Clone)]
pub struct AuthMiddleware {
    verifier: TokenVerifier,
    config: MiddlewareConfig,
}

impl AuthMiddleware {
    pub fn new(verifier: TokenVerifier, config: MiddlewareConfig) -> Self {
        Self { verifier, config }
    }

    pub fn from_key_source(source: Arc<dyn KeySource>, config: MiddlewareConfig) -> Self {
        Self::new(TokenVerifier::new(KeyResolver::new(source)), config)
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub fn config(&self) -> &MiddlewareConfig {
        &self.config
    }
}

/// Put authentication in front of every route of `router`.
///
/// Apply it on the outermost router so exclusion prefixes see full paths:
/// ```ignore
/// let app = Router::new().nest("/api/v1", api::v1::routes());
/// let app = middleware::auth::access::apply(app, auth);
/// ```
pub fn apply<S>(router: Router<S>, auth: Arc<AuthMiddleware>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(auth, access_middleware))
}

async fn access_middleware(
    State(auth): State<Arc<AuthMiddleware>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    if let Some(prefix) = auth.config.excluded_by(&path) {
        tracing::trace!(path = %path, prefix, "path excluded from authentication");
        return next.run(req).await;
    }

    match auth.verifier.verify_request(req.headers()).await {
        Ok(claims) => {
            if auth.config.debug {
                tracing::debug!(path = %path, sub = ?claims.subject(), "access token verified");
            }

            // middleware → extractor
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(err) => {
            tracing::warn!(path = %path, error = %err, "access token verification failed");

            let message = err.client_message(auth.config.debug);
            (auth.config.error_handler)(&req, &message)
        }
    }
}
