//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::net::IpAddr;
use std::time::Duration;

use platform::rate_limit::RateLimitConfig;

use crate::error::{AuthError, AuthResult};

/// Minimum HS256 key length in bytes
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC-SHA256 signing key for access tokens
    pub jwt_secret: Vec<u8>,
    /// Value of the `iss` claim, checked on every decode
    pub jwt_issuer: String,
    /// Access token lifetime (2 hours)
    pub token_ttl: Duration,
    /// How long a logged-out token stays in the revocation cache
    pub revocation_ttl: Duration,
    /// Upper bound on in-process revocation entries
    pub revocation_capacity: u64,
    /// Path prefixes that require a bearer token
    pub protected_prefixes: Vec<String>,
    /// Per-client request limit; `None` disables limiting
    pub rate_limit: Option<RateLimitConfig>,
    /// Reverse proxies whose `X-Forwarded-For` is believed
    pub trusted_proxies: Vec<IpAddr>,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let token_ttl = Duration::from_secs(2 * 3600); // 2 hours

        Self {
            jwt_secret: Vec::new(),
            jwt_issuer: "petwell".to_string(),
            token_ttl,
            revocation_ttl: token_ttl,
            revocation_capacity: 10_000,
            protected_prefixes: vec!["/api/v1/employees".to_string()],
            rate_limit: None,
            trusted_proxies: Vec::new(),
            password_pepper: None,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("token_ttl", &self.token_ttl)
            .field("revocation_ttl", &self.revocation_ttl)
            .field("revocation_capacity", &self.revocation_capacity)
            .field("protected_prefixes", &self.protected_prefixes)
            .field("rate_limit", &self.rate_limit)
            .field("trusted_proxies", &self.trusted_proxies)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AuthConfig {
    /// Create config with a random signing key (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = vec![0u8; MIN_JWT_SECRET_LEN];
        rand::rng().fill_bytes(&mut secret);
        Self {
            jwt_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (random key, lenient rate limit)
    pub fn development() -> Self {
        Self {
            rate_limit: Some(RateLimitConfig::new(100, 60)),
            ..Self::with_random_secret()
        }
    }

    /// Reject configurations the service must not start with
    pub fn validate(&self) -> AuthResult<()> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(AuthError::Internal(format!(
                "JWT secret must be at least {MIN_JWT_SECRET_LEN} bytes"
            )));
        }
        if self.jwt_issuer.trim().is_empty() {
            return Err(AuthError::Internal("JWT issuer must not be empty".to_string()));
        }
        if self.token_ttl.is_zero() || self.revocation_ttl.is_zero() {
            return Err(AuthError::Internal("Token TTLs must be positive".to_string()));
        }
        if let Some(limit) = &self.rate_limit
            && (limit.max_requests == 0 || limit.window.is_zero())
        {
            return Err(AuthError::Internal(
                "Rate limit needs a positive request count and window".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `path` falls under a protected prefix
    ///
    /// Matching respects segment boundaries: `/api/v1/employees` protects
    /// `/api/v1/employees/me` but not `/api/v1/employeesx`.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes.iter().any(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            match path.strip_prefix(prefix) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            }
        })
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
