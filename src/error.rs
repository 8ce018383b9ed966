/*
 * Responsibility
 * - 認証失敗の分類 (credential / token / key / identity / context)
 * - Display はクライアント向けの固定メッセージ。原因は `source()` 側に残す
 * - IntoResponse: 401 + text/plain メッセージ
 */
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::auth::identity::IDENTITY_CONTEXT_KEY;
use crate::services::keys::KeySourceError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header format must be Bearer {{token}}")]
    CredentialsRequired,

    #[error("token is malformed")]
    MalformedToken(#[source] MalformedTokenError),

    #[error("Expected {expected} signing method but token specified {found}")]
    UnsupportedAlgorithm {
        expected: &'static str,
        found: String,
    },

    #[error(r#"jwt from authorization HTTP header is missing value for "kid" in token header"#)]
    MissingKeyId,

    #[error(
        r#"jwt from authorization HTTP header is expecting string value for "kid" in token header but got: {found}"#
    )]
    InvalidKeyIdType { found: &'static str },

    #[error("unable to find JSON Web Key with ID: {kid}")]
    UnknownKeyId {
        kid: String,
        #[source]
        source: KeySourceError,
    },

    #[error("token signature is invalid")]
    InvalidSignature(#[source] jsonwebtoken::errors::Error),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is not valid yet")]
    TokenNotValidYet,

    #[error("expected subject claim to be set but no value was set")]
    EmptyIdentity,

    #[error("unable to decode session data")]
    IdentityParse(#[source] serde_json::Error),

    #[error(
        r#"expected context key "{key}" to transport a value but received nil"#,
        key = IDENTITY_CONTEXT_KEY
    )]
    NoSessionInContext,
}

/// Structural problems with the three-segment credential.
#[derive(Debug, Error)]
pub enum MalformedTokenError {
    #[error("token contains an invalid number of segments")]
    SegmentCount,
    #[error("illegal base64url data in token header: {0}")]
    HeaderBase64(#[from] base64::DecodeError),
    #[error("invalid JSON in token header: {0}")]
    HeaderJson(#[source] serde_json::Error),
    #[error("token header is not a JSON object")]
    HeaderNotObject,
    #[error("{0}")]
    Jwt(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Message written to the client.
    ///
    /// Decoding/parsing causes (and key source failures other than a plain miss)
    /// are only appended when `debug` is enabled.
    pub fn client_message(&self, debug: bool) -> String {
        if !debug {
            return self.to_string();
        }

        match self {
            Self::MalformedToken(cause) => format!("{self}: {cause}"),
            Self::IdentityParse(cause) => format!("{self}: {cause}"),
            Self::UnknownKeyId { source, .. } if !source.is_not_found() => {
                format!("{self}: {source}")
            }
            _ => self.to_string(),
        }
    }

    // Every rejection cause is a client error.
    pub fn status(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status(), self.client_message(false)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{").unwrap_err()
    }

    #[test]
    fn credentials_message_keeps_literal_braces() {
        assert_eq!(
            AuthError::CredentialsRequired.to_string(),
            "Authorization header format must be Bearer {token}"
        );
    }

    #[test]
    fn no_session_message_names_context_key() {
        assert_eq!(
            AuthError::NoSessionInContext.to_string(),
            r#"expected context key "identity" to transport a value but received nil"#
        );
    }

    #[test]
    fn parse_causes_hidden_unless_debug() {
        let err = AuthError::IdentityParse(json_error());
        assert_eq!(err.client_message(false), "unable to decode session data");

        let detailed = err.client_message(true);
        assert!(detailed.starts_with("unable to decode session data: "));
        assert!(detailed.len() > "unable to decode session data: ".len());
    }

    #[test]
    fn malformed_cause_surfaces_in_debug() {
        let err = AuthError::MalformedToken(MalformedTokenError::SegmentCount);
        assert_eq!(err.client_message(false), "token is malformed");
        assert_eq!(
            err.client_message(true),
            "token is malformed: token contains an invalid number of segments"
        );
    }

    #[test]
    fn unknown_kid_miss_has_no_extra_detail() {
        let err = AuthError::UnknownKeyId {
            kid: "abc".into(),
            source: KeySourceError::NotFound { kid: "abc".into() },
        };
        assert_eq!(
            err.client_message(true),
            "unable to find JSON Web Key with ID: abc"
        );
    }

    #[test]
    fn unknown_kid_backend_failure_detail_in_debug() {
        let err = AuthError::UnknownKeyId {
            kid: "abc".into(),
            source: KeySourceError::InvalidKeySet(json_error()),
        };
        assert_eq!(
            err.client_message(false),
            "unable to find JSON Web Key with ID: abc"
        );
        assert!(
            err.client_message(true)
                .starts_with("unable to find JSON Web Key with ID: abc: invalid key set")
        );
    }

    #[test]
    fn into_response_is_unauthorized() {
        let res = AuthError::TokenExpired.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
