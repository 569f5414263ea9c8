//! Logout Use Case
//!
//! Places the presented token in the revocation cache.

use std::sync::Arc;

use axum::http::HeaderMap;
use platform::bearer::extract_bearer;
use platform::crypto::token_fingerprint;

use crate::application::config::AuthConfig;
use crate::domain::repository::{EmployeeRepository, RevocationStore, revocation_key};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;
use crate::infra::jwt::JwtTokenCodec;

/// What a logout call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    Revoked,
    /// Nothing to revoke: no header, an unreadable or expired token, or an
    /// unknown principal
    Ignored,
}

/// Logout use case
pub struct LogoutUseCase<R, C>
where
    R: EmployeeRepository,
    C: RevocationStore,
{
    repo: Arc<R>,
    revocations: Arc<C>,
    codec: Arc<JwtTokenCodec>,
    config: Arc<AuthConfig>,
}

impl<R, C> LogoutUseCase<R, C>
where
    R: EmployeeRepository,
    C: RevocationStore,
{
    pub fn new(
        repo: Arc<R>,
        revocations: Arc<C>,
        codec: Arc<JwtTokenCodec>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            repo,
            revocations,
            codec,
            config,
        }
    }

    /// Idempotent. Only storage failures surface as errors.
    pub async fn execute(&self, headers: &HeaderMap) -> AuthResult<LogoutOutcome> {
        let Ok(token) = extract_bearer(headers) else {
            return Ok(LogoutOutcome::Ignored);
        };
        let fingerprint = token_fingerprint(token);

        let Ok(subject) = self.codec.extract_subject(token) else {
            tracing::debug!(token = %fingerprint, "Logout with unreadable token ignored");
            return Ok(LogoutOutcome::Ignored);
        };
        let Ok(email) = Email::new(&subject) else {
            return Ok(LogoutOutcome::Ignored);
        };
        let Some(employee) = self.repo.find_by_email(&email).await? else {
            tracing::debug!(token = %fingerprint, "Logout for unknown principal ignored");
            return Ok(LogoutOutcome::Ignored);
        };

        // An expired or foreign token must not displace the current revocation
        if let Err(e) = self.codec.verify(token, &employee) {
            tracing::debug!(
                employee_id = %employee.id,
                token = %fingerprint,
                error = %e,
                "Logout with invalid token ignored"
            );
            return Ok(LogoutOutcome::Ignored);
        }

        // Last write wins: a newer logout replaces the previously revoked token
        self.revocations
            .put(
                &revocation_key(&employee.id),
                token,
                self.config.revocation_ttl,
            )
            .await?;

        tracing::info!(
            employee_id = %employee.id,
            token = %fingerprint,
            "Employee logged out"
        );

        Ok(LogoutOutcome::Revoked)
    }
}
