use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, jwk::JwkSet};
use std::collections::HashMap;

use crate::services::keys::source::{KeySource, KeySourceError, index_key_set};

/// Fixed, in-process key set.
///
/// Useful when the key set ships with the deployment, and in tests.
#[derive(Clone)]
pub struct StaticKeySource {
    keys: HashMap<String, DecodingKey>,
}

impl std::fmt::Debug for StaticKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("StaticKeySource")
            .field("kids", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StaticKeySource {
    pub fn new(set: &JwkSet) -> Self {
        Self {
            keys: index_key_set(set),
        }
    }

    // Parse a JWKS document (`{"keys":[...]}`).
    pub fn from_json(json: &str) -> Result<Self, KeySourceError> {
        let set: JwkSet = serde_json::from_str(json)?;
        Ok(Self::new(&set))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn get_key(&self, kid: &str) -> Result<DecodingKey, KeySourceError> {
        self.keys
            .get(kid)
            .cloned()
            .ok_or_else(|| KeySourceError::NotFound {
                kid: kid.to_owned(),
            })
    }
}
