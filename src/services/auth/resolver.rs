//! Token header `kid` → verification key, through the configured key source.

use jsonwebtoken::DecodingKey;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::AuthError;
use crate::services::keys::KeySource;

/// Thin adapter over a shared key source. Holds no state of its own.
#[derive(Clone)]
pub struct KeyResolver {
    source: Arc<dyn KeySource>,
}

impl std::fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyResolver")
            .field("source", &self.source.name())
            .finish()
    }
}

impl KeyResolver {
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self { source }
    }

    /// Resolve the key named by a decoded token header.
    pub async fn resolve(&self, header: &Map<String, Value>) -> Result<DecodingKey, AuthError> {
        let kid = key_id(header)?;
        self.resolve_kid(kid).await
    }

    pub async fn resolve_kid(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        self.source
            .get_key(kid)
            .await
            .map_err(|source| AuthError::UnknownKeyId {
                kid: kid.to_owned(),
                source,
            })
    }
}

/// Read `kid` from a token header, checking presence and type.
pub fn key_id(header: &Map<String, Value>) -> Result<&str, AuthError> {
    match header.get("kid") {
        None => Err(AuthError::MissingKeyId),
        Some(Value::String(kid)) => Ok(kid),
        Some(other) => Err(AuthError::InvalidKeyIdType {
            found: json_type_name(other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        // JSON numbers are IEEE-754 doubles
        Value::Number(_) => "float64",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::keys::StaticKeySource;
    use serde_json::json;

    const FIXTURE_JWKS: &str = include_str!("../../../tests/fixtures/jwks.json");

    fn header(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn resolver() -> KeyResolver {
        KeyResolver::new(Arc::new(StaticKeySource::from_json(FIXTURE_JWKS).unwrap()))
    }

    #[test]
    fn missing_kid() {
        let err = key_id(&header(json!({"alg": "RS256"}))).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"jwt from authorization HTTP header is missing value for "kid" in token header"#
        );
    }

    #[test]
    fn numeric_kid_names_received_type() {
        let err = key_id(&header(json!({"alg": "RS256", "kid": 123}))).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"jwt from authorization HTTP header is expecting string value for "kid" in token header but got: float64"#
        );
    }

    #[test]
    fn other_non_string_kids() {
        for (kid, name) in [
            (json!(null), "null"),
            (json!(true), "bool"),
            (json!(["a"]), "array"),
            (json!({"id": "a"}), "object"),
        ] {
            let err = key_id(&header(json!({ "kid": kid }))).unwrap_err();
            assert!(
                matches!(err, AuthError::InvalidKeyIdType { found } if found == name),
                "{name}"
            );
        }
    }

    #[tokio::test]
    async fn unknown_kid_message_includes_kid() {
        let err = resolver()
            .resolve(&header(json!({"kid": "not-a-valid-kid"})))
            .await
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "unable to find JSON Web Key with ID: not-a-valid-kid"
        );
    }

    #[tokio::test]
    async fn known_kid_resolves() {
        let key = resolver()
            .resolve(&header(json!({"kid": "33eee3c0-acd7-419d-88f9-cc149ee2238e"})))
            .await;
        assert!(key.is_ok());
    }
}
