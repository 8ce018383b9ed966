/*
 * Responsibility
 * - 検証済み claims → Session / Identity (アプリから見た呼び出し元)
 * - リクエスト中どこからでも extensions から再導出できる
 *
 * Notes
 * - Identity の id は `sub` claim (不透明な文字列として扱う)
 * - 暗号学的な検証はしない。入力は TokenVerifier を通ったものに限る
 */
use axum::http::{Extensions, Request};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::services::auth::verifier::VerifiedClaims;

/// Name of the request-context slot holding the verified claims.
pub const IDENTITY_CONTEXT_KEY: &str = "identity";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    id: String,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Result<Self, AuthError> {
        let id = id.into();
        if id.is_empty() {
            return Err(AuthError::EmptyIdentity);
        }
        Ok(Self { id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    identity: Identity,
}

#[derive(Deserialize)]
struct SubjectClaims {
    #[serde(default)]
    sub: Option<String>,
}

impl Session {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn from_claims(claims: &VerifiedClaims) -> Result<Self, AuthError> {
        let encoded = serde_json::to_vec(claims.as_map()).map_err(AuthError::IdentityParse)?;
        let decoded: SubjectClaims =
            serde_json::from_slice(&encoded).map_err(AuthError::IdentityParse)?;

        // absent, null and "" all end up here
        let identity = Identity::new(decoded.sub.unwrap_or_default())?;
        Ok(Self::new(identity))
    }
}

pub fn session_from_extensions(extensions: &Extensions) -> Result<Session, AuthError> {
    let claims = extensions
        .get::<VerifiedClaims>()
        .ok_or(AuthError::NoSessionInContext)?;
    Session::from_claims(claims)
}

pub fn session_from_request<B>(req: &Request<B>) -> Result<Session, AuthError> {
    session_from_extensions(req.extensions())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn claims(value: Value) -> VerifiedClaims {
        match value {
            Value::Object(map) => VerifiedClaims::new(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn identity_round_trips_through_claims() {
        let identity = Identity::new("1234567890").unwrap();
        let claims = claims(json!({ "sub": identity.id(), "exp": 9999999999u64 }));

        let session = Session::from_claims(&claims).unwrap();
        assert_eq!(session.identity(), &identity);
    }

    #[test]
    fn serializes_as_nested_identity() {
        let session = Session::new(Identity::new("1234567890").unwrap());
        assert_eq!(
            serde_json::to_string(&session).unwrap(),
            r#"{"identity":{"id":"1234567890"}}"#
        );
    }

    #[test]
    fn extraction_is_idempotent() {
        let mut extensions = Extensions::new();
        extensions.insert(claims(json!({"sub": "abc"})));

        let first = session_from_extensions(&extensions).unwrap();
        let second = session_from_extensions(&extensions).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_or_blank_subject_is_empty_identity() {
        for value in [json!({}), json!({"sub": ""}), json!({"sub": null})] {
            let err = Session::from_claims(&claims(value.clone())).unwrap_err();
            assert!(matches!(err, AuthError::EmptyIdentity), "{value}");
        }
    }

    #[test]
    fn non_string_subject_is_parse_error() {
        let err = Session::from_claims(&claims(json!({"sub": 42}))).unwrap_err();
        assert!(matches!(err, AuthError::IdentityParse(_)));
        assert_eq!(err.to_string(), "unable to decode session data");
    }

    #[test]
    fn empty_identity_cannot_be_built() {
        assert!(matches!(
            Identity::new("").unwrap_err(),
            AuthError::EmptyIdentity
        ));
    }

    #[test]
    fn nothing_in_context() {
        let req = Request::new(());
        let err = session_from_request(&req).unwrap_err();
        assert!(matches!(err, AuthError::NoSessionInContext));
    }
}
