//! Authenticate Request Use Case
//!
//! Turns an `Authorization` header into a request-scoped [`Identity`].

use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use platform::bearer::extract_bearer;
use platform::crypto::{constant_time_eq, token_fingerprint};

use crate::domain::entity::identity::Identity;
use crate::domain::policy::AuthorizationPolicy;
use crate::domain::repository::{EmployeeRepository, RevocationStore, revocation_key};
use crate::domain::token::TokenError;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::JwtTokenCodec;

/// Authenticate request use case
///
/// Stages run strictly in order and the first failure is terminal:
/// bearer extraction, subject resolution, principal lookup, then token
/// verification together with the revocation check.
pub struct AuthenticateRequestUseCase<R, C>
where
    R: EmployeeRepository,
    C: RevocationStore,
{
    repo: Arc<R>,
    revocations: Arc<C>,
    codec: Arc<JwtTokenCodec>,
}

impl<R, C> AuthenticateRequestUseCase<R, C>
where
    R: EmployeeRepository,
    C: RevocationStore,
{
    pub fn new(repo: Arc<R>, revocations: Arc<C>, codec: Arc<JwtTokenCodec>) -> Self {
        Self {
            repo,
            revocations,
            codec,
        }
    }

    pub async fn execute(&self, headers: &HeaderMap) -> AuthResult<Identity> {
        self.execute_at(headers, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> AuthResult<Identity> {
        let token = extract_bearer(headers)?;
        self.authenticate_token(token, now).await
    }

    /// Validate a raw bearer token at `now`
    pub async fn authenticate_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Identity> {
        let fingerprint = token_fingerprint(token);

        let subject = self.codec.extract_subject(token).inspect_err(|e| {
            tracing::debug!(token = %fingerprint, error = %e, "Bearer token rejected");
        })?;
        let email = Email::new(&subject)
            .map_err(|_| AuthError::TokenInvalid(TokenError::Malformed.to_string()))?;

        let employee = self.repo.find_by_email(&email).await?.ok_or_else(|| {
            tracing::warn!(token = %fingerprint, "Bearer token names an unknown principal");
            AuthError::TokenInvalid("Unknown principal".to_string())
        })?;

        if !employee.can_login() {
            tracing::warn!(employee_id = %employee.id, "Bearer token for a blocked account");
            return Err(AuthError::TokenInvalid("Account disabled".to_string()));
        }

        self.codec.verify_at(token, &employee, now).inspect_err(|e| {
            tracing::debug!(
                employee_id = %employee.id,
                token = %fingerprint,
                error = %e,
                "Bearer token rejected"
            );
        })?;

        let key = revocation_key(&employee.id);
        if let Some(revoked) = self.revocations.get(&key).await?
            && constant_time_eq(revoked.as_bytes(), token.as_bytes())
        {
            tracing::info!(
                employee_id = %employee.id,
                token = %fingerprint,
                "Revoked token presented"
            );
            return Err(TokenError::Revoked.into());
        }

        tracing::debug!(employee_id = %employee.id, "Request authenticated");

        Ok(Identity {
            employee_id: employee.id,
            email: employee.email.to_string(),
            role: employee.role,
            authorities: AuthorizationPolicy::authorities_for(employee.role),
            token: token.to_string(),
        })
    }
}
