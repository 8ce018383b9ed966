/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, JWKS_URL, AUTH_* など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - ライブラリ本体は環境変数を読まない (binary 専用)
 */
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,

    pub jwks_url: Url,
    pub jwks_fetch_timeout: Duration,
    pub jwks_min_refresh: Duration,

    pub auth_exclude_paths: Vec<String>,
    pub auth_debug: bool,
    pub access_token_leeway_seconds: u64,

    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value lookup (the environment in production, a map in tests).
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match var("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let jwks_url = var("JWKS_URL").ok_or(ConfigError::Missing("JWKS_URL"))?;
        let jwks_url = Url::parse(&jwks_url).map_err(|_| ConfigError::Invalid("JWKS_URL"))?;

        let seconds = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match var(key) {
                Some(v) => v.parse().map_err(|_| ConfigError::Invalid(key)),
                None => Ok(default),
            }
        };

        let jwks_fetch_timeout = Duration::from_secs(seconds("JWKS_FETCH_TIMEOUT_SECONDS", 10)?);
        let jwks_min_refresh = Duration::from_secs(seconds("JWKS_MIN_REFRESH_SECONDS", 30)?);
        let access_token_leeway_seconds = seconds("ACCESS_TOKEN_LEEWAY_SECONDS", 60)?;
        let request_timeout = Duration::from_secs(seconds("REQUEST_TIMEOUT_SECONDS", 30)?);

        let auth_exclude_paths = var("AUTH_EXCLUDE_PATHS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let auth_debug = match var("AUTH_DEBUG").as_deref().map(str::to_ascii_lowercase) {
            None => false,
            Some(v) => match v.as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => return Err(ConfigError::Invalid("AUTH_DEBUG")),
            },
        };

        Ok(Self {
            addr,
            jwks_url,
            jwks_fetch_timeout,
            jwks_min_refresh,
            auth_exclude_paths,
            auth_debug,
            access_token_leeway_seconds,
            request_timeout,
        })
    }
}
