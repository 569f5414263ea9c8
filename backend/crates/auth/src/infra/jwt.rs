//! JWT Token Codec
//!
//! HS256 access tokens. Expiry is enforced here rather than by the library
//! so that the clock can be supplied by the caller; a token is expired from
//! the exact second named in `exp`.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::principal::Principal;
use crate::domain::token::{TokenClaims, TokenError};

/// Freshly signed token together with its claims
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.claims.exp, 0)
    }
}

pub struct JwtTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
}

impl JwtTokenCodec {
    pub fn new(secret: &[u8], ttl: Duration, issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer,
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl, config.jwt_issuer.clone())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `principal`, valid for the configured TTL from now
    pub fn issue<P: Principal + ?Sized>(&self, principal: &P) -> Result<IssuedToken, TokenError> {
        self.issue_at(principal, Utc::now())
    }

    pub fn issue_at<P: Principal + ?Sized>(
        &self,
        principal: &P,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let ttl_secs = i64::try_from(self.ttl.as_secs())
            .map_err(|_| TokenError::Encoding("token TTL out of range".to_string()))?;
        let iat = now.timestamp();

        let claims = TokenClaims {
            sub: principal.subject().to_string(),
            jti: Uuid::new_v4().to_string(),
            iat,
            exp: iat.saturating_add(ttl_secs),
            iss: self.issuer.clone(),
            authorities: principal.authorities(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify signature, structure and issuer. Expiry is not checked.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                JwtErrorKind::InvalidIssuer => TokenError::UntrustedIssuer,
                _ => TokenError::Malformed,
            })
    }

    /// Subject of a correctly signed token
    ///
    /// Used to find the principal before full validation, so the signature
    /// is still verified here.
    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        let claims = self.decode(token)?;
        if claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }
        Ok(claims.sub)
    }

    /// Full check against an expected principal at `now`
    pub fn verify_at<P: Principal + ?Sized>(
        &self,
        token: &str,
        principal: &P,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, TokenError> {
        let claims = self.decode(token)?;

        if claims.is_expired_at(now.timestamp()) {
            return Err(TokenError::Expired);
        }
        if claims.sub != principal.subject() {
            return Err(TokenError::SubjectMismatch);
        }

        Ok(claims)
    }

    pub fn verify<P: Principal + ?Sized>(
        &self,
        token: &str,
        principal: &P,
    ) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, principal, Utc::now())
    }

    /// Fail-closed boolean form of [`Self::verify`]
    pub fn validate<P: Principal + ?Sized>(&self, token: &str, principal: &P) -> bool {
        self.verify(token, principal).is_ok()
    }

    pub fn validate_at<P: Principal + ?Sized>(
        &self,
        token: &str,
        principal: &P,
        now: DateTime<Utc>,
    ) -> bool {
        self.verify_at(token, principal, now).is_ok()
    }
}

impl fmt::Debug for JwtTokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenCodec")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}
