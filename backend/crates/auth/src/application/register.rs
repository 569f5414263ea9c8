//! Register Use Case
//!
//! Creates a new employee account and signs the first access token.

use std::sync::Arc;

use platform::crypto::token_fingerprint;

use crate::application::config::AuthConfig;
use crate::domain::entity::employee::{Employee, normalize_name};
use crate::domain::repository::EmployeeRepository;
use crate::domain::value_object::{
    email::Email,
    job_title::JobTitle,
    password::{EmployeePassword, RawPassword},
    role::Role,
};
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::{IssuedToken, JwtTokenCodec};

/// Register input
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub job_title: Option<JobTitle>,
}

/// Register output
pub struct RegisterOutput {
    pub employee: Employee,
    pub token: IssuedToken,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: EmployeeRepository,
{
    repo: Arc<R>,
    codec: Arc<JwtTokenCodec>,
    config: Arc<AuthConfig>,
}

impl<R> RegisterUseCase<R>
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

    /// Public self-registration; the account always starts as a CLIENT
    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        self.execute_with_role(input, Role::Client).await
    }

    /// Create an account with an explicit role
    ///
    /// Not reachable over HTTP. Used to seed the bootstrap administrator.
    pub async fn execute_with_role(
        &self,
        input: RegisterInput,
        role: Role,
    ) -> AuthResult<RegisterOutput> {
        let first_name = normalize_name("First name", &input.first_name)?;
        let last_name = normalize_name("Last name", &input.last_name)?;
        let email = Email::new(&input.email)?;

        // Fast path; the repository still enforces uniqueness atomically
        if self.repo.exists_by_email(&email).await? {
            return Err(AuthError::EntityAlreadyExists(email.to_string()));
        }

        let raw_password = RawPassword::new(input.password)?;
        let password = EmployeePassword::from_raw(&raw_password, self.config.pepper())?;

        let employee = Employee::new(
            first_name,
            last_name,
            email,
            password,
            role,
            input.job_title,
        );

        self.repo.create(&employee).await?;

        let token = self.codec.issue(&employee)?;

        tracing::info!(
            employee_id = %employee.id,
            role = %employee.role,
            token = %token_fingerprint(&token.token),
            "Employee registered"
        );

        Ok(RegisterOutput { employee, token })
    }
}
