//! Token Claims and Errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload of an issued access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Principal email
    pub sub: String,
    /// Unique token ID
    pub jti: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
    pub iss: String,
    /// Authorities at issue time; informational, the principal's current
    /// role wins at request time
    #[serde(rename = "role", default)]
    pub authorities: Vec<String>,
}

impl TokenClaims {
    /// Expired at or after `exp`
    #[inline]
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        now_secs >= self.exp
    }
}

/// Why a token was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token is malformed")]
    Malformed,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token subject does not match principal")]
    SubjectMismatch,

    #[error("Token issuer is not trusted")]
    UntrustedIssuer,

    #[error("Token has been revoked")]
    Revoked,

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}
