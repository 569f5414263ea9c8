//! Bearer Token Transport
//!
//! Extraction of `Authorization: Bearer <token>` credentials (RFC 6750).

use axum::http::{HeaderMap, HeaderValue, header};
use thiserror::Error;

/// Scheme prefix, matched exactly (including the single space)
pub const BEARER_PREFIX: &str = "Bearer ";

/// Why a bearer credential could not be read from a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BearerError {
    /// No `Authorization` header at all
    #[error("Missing Authorization header")]
    Missing,

    /// Header present but not a usable bearer credential
    #[error("Malformed Authorization header")]
    Malformed,
}

/// Extract the raw bearer token from request headers
///
/// ## Errors
/// * `BearerError::Missing` - no `Authorization` header
/// * `BearerError::Malformed` - non-UTF-8 value, another scheme, or an empty token
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::Malformed)?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(BearerError::Malformed)?
        .trim();

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(BearerError::Malformed);
    }

    Ok(token)
}

/// `WWW-Authenticate` challenge sent with 401 responses
pub fn www_authenticate_challenge() -> HeaderValue {
    HeaderValue::from_static("Bearer")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&headers), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_missing() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Err(BearerError::Missing));
    }

    #[test]
    fn test_extract_bearer_malformed() {
        assert_eq!(
            extract_bearer(&headers_with("Basic dXNlcjpwYXNz")),
            Err(BearerError::Malformed)
        );
        assert_eq!(
            extract_bearer(&headers_with("bearer abc.def.ghi")),
            Err(BearerError::Malformed)
        );
        assert_eq!(extract_bearer(&headers_with("Bearer ")), Err(BearerError::Malformed));
        assert_eq!(extract_bearer(&headers_with("Bearer")), Err(BearerError::Malformed));
        assert_eq!(
            extract_bearer(&headers_with("Bearer abc def")),
            Err(BearerError::Malformed)
        );
    }
}
