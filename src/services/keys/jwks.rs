//! Remote JSON Web Key Set, fetched over HTTP and cached in-process.
//!
//! Policy:
//! - Cache hit: answered from memory, no I/O.
//! - Cache miss: the set is re-fetched once (keys rotate) and the lookup retried.
//! - Refreshes are serialized and rate-limited by `min_refresh_interval`, failed ones
//!   included, so a stream of unknown key ids does not turn into a stream of fetches.
//! - Lookups of cached keys never wait for a refresh in flight.
//! - No retries; a failed fetch is returned to the caller as-is.

use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, jwk::JwkSet};
use reqwest::header::ACCEPT;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use crate::services::keys::source::{KeySource, KeySourceError, index_key_set};

#[derive(Debug, Clone, Copy)]
pub struct JwksFetcherOptions {
    // Upper bound for one key set request.
    pub fetch_timeout: Duration,
    // Minimum time between two refreshes triggered by unknown key ids.
    pub min_refresh_interval: Duration,
}

impl Default for JwksFetcherOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            min_refresh_interval: Duration::from_secs(30),
        }
    }
}

type KeyMap = HashMap<String, DecodingKey>;

pub struct JwksFetcher {
    url: Url,
    client: reqwest::Client,
    min_refresh_interval: Duration,
    keys: RwLock<KeyMap>,
    // Held for the whole refresh. Holds the start of the last attempt, successful or not.
    refresh: Mutex<Option<Instant>>,
}

impl std::fmt::Debug for JwksFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksFetcher")
            .field("url", &self.url.as_str())
            .field("min_refresh_interval", &self.min_refresh_interval)
            .finish()
    }
}

impl JwksFetcher {
    pub fn new(url: Url, options: JwksFetcherOptions) -> Result<Self, KeySourceError> {
        let client = reqwest::Client::builder()
            .timeout(options.fetch_timeout)
            .build()?;

        Ok(Self {
            url,
            client,
            min_refresh_interval: options.min_refresh_interval,
            keys: RwLock::new(KeyMap::new()),
            refresh: Mutex::new(None),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn cached(&self, kid: &str) -> Option<DecodingKey> {
        self.keys.read().await.get(kid).cloned()
    }

    async fn fetch(&self) -> Result<KeyMap, KeySourceError> {
        debug!(url = %self.url, "fetching JSON Web Key Set");

        let set: JwkSet = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let keys = index_key_set(&set);
        info!(url = %self.url, keys = keys.len(), "JSON Web Key Set refreshed");

        Ok(keys)
    }
}

#[async_trait]
impl KeySource for JwksFetcher {
    fn name(&self) -> &'static str {
        "jwks"
    }

    async fn get_key(&self, kid: &str) -> Result<DecodingKey, KeySourceError> {
        if let Some(key) = self.cached(kid).await {
            return Ok(key);
        }

        // One refresh in flight; cache hits never wait on it.
        let mut last_attempt = self.refresh.lock().await;

        // Another request may have refreshed while we were waiting.
        if let Some(key) = self.cached(kid).await {
            return Ok(key);
        }

        let not_found = || KeySourceError::NotFound {
            kid: kid.to_owned(),
        };

        if last_attempt.is_some_and(|at| at.elapsed() < self.min_refresh_interval) {
            debug!(kid, "key set refresh attempted recently, not fetching again");
            return Err(not_found());
        }

        // Counted before the fetch, so a failing endpoint is rate-limited too.
        *last_attempt = Some(Instant::now());

        let keys = match self.fetch().await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(url = %self.url, error = %err, "JSON Web Key Set refresh failed");
                return Err(err);
            }
        };
        let key = keys.get(kid).cloned();
        *self.keys.write().await = keys;

        key.ok_or_else(not_found)
    }
}
