use axum::http::{HeaderMap, header};

use crate::error::AuthError;

/// Extract `<token>` from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively. An absent header, a non-UTF-8 value, another
/// scheme, a missing token or extra fields are all `CredentialsRequired`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::CredentialsRequired)?;

    let mut fields = value.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::CredentialsRequired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn missing_header() {
        let err = bearer_token(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AuthError::CredentialsRequired));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers("bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&headers("BEARER abc")).unwrap(), "abc");
        assert_eq!(bearer_token(&headers("Bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn rejects_scheme_without_token() {
        for value in ["bearer ", "Bearer", ""] {
            let err = bearer_token(&headers(value)).unwrap_err();
            assert!(matches!(err, AuthError::CredentialsRequired), "{value:?}");
        }
    }

    #[test]
    fn rejects_other_schemes_and_extra_fields() {
        for value in ["Basic dXNlcjpwYXNz", "Bearer abc def", "Token abc"] {
            let err = bearer_token(&headers(value)).unwrap_err();
            assert!(matches!(err, AuthError::CredentialsRequired), "{value:?}");
        }
    }
}
