//! Login Use Case
//!
//! Verifies email and password credentials and signs an access token.

use std::sync::Arc;

use platform::crypto::token_fingerprint;

use crate::application::config::AuthConfig;
use crate::domain::entity::employee::Employee;
use crate::domain::repository::EmployeeRepository;
use crate::domain::value_object::{
    email::Email,
    password::{EmployeePassword, RawPassword},
};
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::{IssuedToken, JwtTokenCodec};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login output
pub struct LoginOutput {
    pub employee: Employee,
    pub token: IssuedToken,
}

/// Login use case
pub struct LoginUseCase<R>
where
    R: EmployeeRepository,
{
    repo: Arc<R>,
    codec: Arc<JwtTokenCodec>,
    config: Arc<AuthConfig>,
}

impl<R> LoginUseCase<R>
where
    R: EmployeeRepository,
{
    pub fn new(repo: Arc<R>, codec: Arc<JwtTokenCodec>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            codec,
            config,
        }
    }

    /// Unknown email, malformed input and a wrong password all fail with the
    /// same `BadCredentials` so callers cannot tell which accounts exist.
    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let email = Email::new(&input.email).map_err(|_| AuthError::BadCredentials)?;
        let raw_password =
            RawPassword::new(input.password).map_err(|_| AuthError::BadCredentials)?;

        let mut employee = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::BadCredentials)?;

        if !employee.password.verify(&raw_password, self.config.pepper()) {
            tracing::warn!(employee_id = %employee.id, "Login rejected: wrong password");
            return Err(AuthError::BadCredentials);
        }

        if let Some(reason) = employee.status.blocking_reason() {
            tracing::warn!(employee_id = %employee.id, reason, "Login rejected: account blocked");
            return Err(AuthError::AccountDisabled);
        }

        if employee.password.needs_rehash() {
            self.upgrade_hash(&mut employee, &raw_password).await;
        }

        let token = self.codec.issue(&employee)?;

        tracing::info!(
            employee_id = %employee.id,
            token = %token_fingerprint(&token.token),
            "Employee logged in"
        );

        Ok(LoginOutput { employee, token })
    }

    /// Re-hash with current parameters; failure leaves the old hash in place
    async fn upgrade_hash(&self, employee: &mut Employee, raw_password: &RawPassword) {
        let rehashed = match EmployeePassword::from_raw(raw_password, self.config.pepper()) {
            Ok(password) => password,
            Err(e) => {
                tracing::warn!(employee_id = %employee.id, error = %e, "Password rehash failed");
                return;
            }
        };

        let previous = std::mem::replace(&mut employee.password, rehashed);
        if let Err(e) = self.repo.update(employee).await {
            tracing::warn!(employee_id = %employee.id, error = %e, "Password rehash not persisted");
            employee.password = previous;
        } else {
            tracing::debug!(employee_id = %employee.id, "Password hash upgraded");
        }
    }
}
