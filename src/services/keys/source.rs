//! Key source interface used by the key resolver.
use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, jwk::JwkSet};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

/// Key-source errors (lookup miss / transport / key set content).
///
/// Note:
/// - The resolver folds every variant into an "unknown key id" rejection; the variant
///   is only kept for diagnostics.
#[derive(Debug, Error)]
pub enum KeySourceError {
    #[error("no JSON Web Key with ID {kid:?} in key set")]
    NotFound { kid: String },
    #[error("key set request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid key set: {0}")]
    InvalidKeySet(#[from] serde_json::Error),
}

impl KeySourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Maps a key id to the verification key currently published under it.
///
/// Implementations are shared by every in-flight request and must tolerate concurrent
/// lookups. Any caching / refresh policy lives behind this trait.
#[async_trait]
pub trait KeySource: Send + Sync {
    // Source name (for logging).
    fn name(&self) -> &'static str;

    async fn get_key(&self, kid: &str) -> Result<DecodingKey, KeySourceError>;
}

/// Index a key set by `kid`.
///
/// Keys without a `kid`, or that cannot be turned into a verification key, are skipped.
pub(crate) fn index_key_set(set: &JwkSet) -> HashMap<String, DecodingKey> {
    let mut keys = HashMap::with_capacity(set.keys.len());

    for jwk in &set.keys {
        let Some(kid) = jwk.common.key_id.as_deref() else {
            warn!("skipping JSON Web Key without \"kid\"");
            continue;
        };

        match DecodingKey::from_jwk(jwk) {
            Ok(key) => {
                keys.insert(kid.to_owned(), key);
            }
            Err(err) => warn!(kid, error = %err, "skipping unusable JSON Web Key"),
        }
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_JWKS: &str = include_str!("../../../tests/fixtures/jwks.json");

    #[test]
    fn indexes_fixture_key_by_kid() {
        let set: JwkSet = serde_json::from_str(FIXTURE_JWKS).unwrap();
        let keys = index_key_set(&set);

        assert_eq!(keys.len(), 1);
        assert!(keys.contains_key("33eee3c0-acd7-419d-88f9-cc149ee2238e"));
    }

    #[test]
    fn skips_keys_without_kid() {
        let set: JwkSet = serde_json::from_str(
            r#"{"keys":[{"kty":"oct","k":"c2VjcmV0"},{"kty":"oct","kid":"hmac","k":"c2VjcmV0"}]}"#,
        )
        .unwrap();
        let keys = index_key_set(&set);

        assert_eq!(keys.len(), 1);
        assert!(keys.contains_key("hmac"));
    }
}
