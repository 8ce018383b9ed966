/*
 * Responsibility
 * - tracing 初期化 → Config読み込み → 依存生成 (key source / verifier / middleware)
 * - Router 組み立て + Middleware の適用 (auth / http)
 * - axum::serve() で起動
 */
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tracing_subscriber::EnvFilter;

use crate::{
    api,
    config::Config,
    middleware::{
        self,
        auth::{AuthMiddleware, MiddlewareConfig},
        http::HttpLimits,
    },
    services::{
        auth::{KeyResolver, TokenVerifier},
        keys::{JwksFetcher, JwksFetcherOptions},
    },
    state::AppState,
};

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    let state = build_state(&config)?;

    let app = build_router(state);
    let app = middleware::http::apply(
        app,
        HttpLimits {
            request_timeout: config.request_timeout,
            ..HttpLimits::default()
        },
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, jwks_url = %config.jwks_url, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState> {
    let key_source = JwksFetcher::new(
        config.jwks_url.clone(),
        JwksFetcherOptions {
            fetch_timeout: config.jwks_fetch_timeout,
            min_refresh_interval: config.jwks_min_refresh,
        },
    )?;

    let verifier = TokenVerifier::with_leeway(
        KeyResolver::new(Arc::new(key_source)),
        config.access_token_leeway_seconds,
    );

    let auth = AuthMiddleware::new(
        verifier,
        MiddlewareConfig {
            exclude_paths: config.auth_exclude_paths.clone(),
            debug: config.auth_debug,
            ..MiddlewareConfig::default()
        },
    );

    Ok(AppState::new(Arc::new(auth)))
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new().nest("/api/v1", api::v1::routes());

    // outermost, so exclusion prefixes match full paths
    middleware::auth::apply(router, state.auth.clone()).with_state(state)
}
