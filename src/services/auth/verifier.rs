use axum::http::HeaderMap;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};
use serde_json::{Map, Value};

use crate::error::{AuthError, MalformedTokenError};
use crate::services::auth::bearer::bearer_token;
use crate::services::auth::resolver::KeyResolver;

/// The only signing algorithm accepted.
pub const PINNED_ALGORITHM: Algorithm = Algorithm::RS256;
const PINNED_ALGORITHM_NAME: &str = "RS256";

/// Claims of a token whose signature and time window have been checked.
///
/// Only `TokenVerifier` hands these out; this is the value stored in request extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedClaims(Map<String, Value>);

impl VerifiedClaims {
    pub(crate) fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn subject(&self) -> Option<&str> {
        self.0.get("sub").and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// RS256 bearer-token verifier.
///
/// Order of checks:
/// 1. three base64url segments, JSON object header
/// 2. `alg` is the pinned algorithm
/// 3. `kid` resolves through the key resolver
/// 4. signature (jsonwebtoken)
/// 5. claims JSON, `exp` / `nbf` when present
#[derive(Clone)]
pub struct TokenVerifier {
    resolver: KeyResolver,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("resolver", &self.resolver)
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(resolver: KeyResolver) -> Self {
        Self::with_leeway(resolver, 0)
    }

    pub fn with_leeway(resolver: KeyResolver, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(PINNED_ALGORITHM);
        validation.leeway = leeway_seconds;
        validation.validate_nbf = true;
        // Identity only: no issuer / audience policy, and `exp` is checked only when present.
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            resolver,
            validation,
        }
    }

    /// Verify the bearer credential carried by `headers`.
    pub async fn verify_request(&self, headers: &HeaderMap) -> Result<VerifiedClaims, AuthError> {
        let token = bearer_token(headers)?;
        self.verify(token).await
    }

    pub async fn verify(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        let header = decode_header(token)?;
        check_algorithm(&header)?;

        let key = self.resolver.resolve(&header).await?;

        let data = jsonwebtoken::decode::<Map<String, Value>>(token, &key, &self.validation)
            .map_err(map_jwt_error)?;

        Ok(VerifiedClaims::new(data.claims))
    }
}

// jsonwebtoken's typed header rejects a non-string `kid` outright, so the header is read
// as raw JSON first.
fn decode_header(token: &str) -> Result<Map<String, Value>, AuthError> {
    let malformed = AuthError::MalformedToken;

    let segments: Vec<&str> = token.split('.').collect();
    let [header, _, _] = segments.as_slice() else {
        return Err(malformed(MalformedTokenError::SegmentCount));
    };

    let raw = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|e| malformed(e.into()))?;

    match serde_json::from_slice(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(malformed(MalformedTokenError::HeaderNotObject)),
        Err(e) => Err(malformed(MalformedTokenError::HeaderJson(e))),
    }
}

fn check_algorithm(header: &Map<String, Value>) -> Result<(), AuthError> {
    let found = match header.get("alg") {
        Some(Value::String(alg)) if alg == PINNED_ALGORITHM_NAME => return Ok(()),
        Some(Value::String(alg)) => alg.clone(),
        Some(other) => other.to_string(),
        None => "no algorithm".to_owned(),
    };

    Err(AuthError::UnsupportedAlgorithm {
        expected: PINNED_ALGORITHM_NAME,
        found,
    })
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::ImmatureSignature => AuthError::TokenNotValidYet,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::InvalidClaimFormat(_)
        | ErrorKind::MissingRequiredClaim(_) => {
            AuthError::MalformedToken(MalformedTokenError::Jwt(err))
        }
        // signature mismatch, unusable key, key/algorithm mismatch
        _ => AuthError::InvalidSignature(err),
    }
}
