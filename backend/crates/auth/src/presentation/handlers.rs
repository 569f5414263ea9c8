//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use std::str::FromStr;
use std::sync::Arc;

use platform::rate_limit::GovernorRateLimitStore;

use crate::application::config::AuthConfig;
use crate::application::{
    EmployeeDirectoryUseCase, LoginInput, LoginUseCase, LogoutUseCase, RegisterInput,
    RegisterUseCase,
};
use crate::domain::entity::identity::Identity;
use crate::domain::policy::AuthorizationPolicy;
use crate::domain::repository::{EmployeeRepository, RevocationStore};
use crate::domain::value_object::{employee_id::EmployeeId, role::Permission};
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::JwtTokenCodec;
use crate::presentation::dto::{
    EmployeeResponse, LoginRequest, RegisterRequest, TokenResponse, UpdateEmployeeRequest,
};

/// Shared state for auth handlers and middleware
pub struct AuthAppState<R, C>
where
    R: EmployeeRepository + Send + Sync + 'static,
    C: RevocationStore + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub revocations: Arc<C>,
    pub codec: Arc<JwtTokenCodec>,
    pub config: Arc<AuthConfig>,
    /// Absent when rate limiting is disabled
    pub rate_limiter: Option<Arc<GovernorRateLimitStore>>,
}

impl<R, C> Clone for AuthAppState<R, C>
where
    R: EmployeeRepository + Send + Sync + 'static,
    C: RevocationStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            revocations: self.revocations.clone(),
            codec: self.codec.clone(),
            config: self.config.clone(),
            rate_limiter: self.rate_limiter.clone(),
        }
    }
}

// ============================================================================
// Register / Login / Logout
// ============================================================================

/// POST /api/v1/auth/register
pub async fn register<R, C>(
    State(state): State<AuthAppState<R, C>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: EmployeeRepository + Send + Sync + 'static,
    C: RevocationStore + Send + Sync + 'static,
{
    let use_case =
        RegisterUseCase::new(state.repo.clone(), state.codec.clone(), state.config.clone());

    let output = use_case
        .execute(RegisterInput {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
            job_title: req.job_title,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse::new(output.token, &output.employee)),
    ))
}

/// POST /api/v1/auth/login (also served at /api/v1/auth/authenticate)
pub async fn login<R, C>(
    State(state): State<AuthAppState<R, C>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: EmployeeRepository + Send + Sync + 'static,
    C: RevocationStore + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.codec.clone(), state.config.clone());

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(TokenResponse::new(output.token, &output.employee)))
}

/// POST /api/v1/auth/logout
///
/// Always 204. Revocation storage failures are logged, not surfaced.
pub async fn logout<R, C>(State(state): State<AuthAppState<R, C>>, headers: HeaderMap) -> StatusCode
where
    R: EmployeeRepository + Send + Sync + 'static,
    C: RevocationStore + Send + Sync + 'static,
{
    let use_case = LogoutUseCase::new(
        state.repo.clone(),
        state.revocations.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    if let Err(e) = use_case.execute(&headers).await {
        tracing::warn!(error = %e, "Logout could not record revocation");
    }

    StatusCode::NO_CONTENT
}

// ============================================================================
// Employee Directory
// ============================================================================

/// GET /api/v1/employees/me
pub async fn me<R, C>(
    State(state): State<AuthAppState<R, C>>,
    identity: Identity,
) -> AuthResult<Json<EmployeeResponse>>
where
    R: EmployeeRepository + Send + Sync + 'static,
    C: RevocationStore + Send + Sync + 'static,
{
    let employee = EmployeeDirectoryUseCase::new(state.repo.clone())
        .get(&identity.employee_id)
        .await?;

    Ok(Json(EmployeeResponse::from(&employee)))
}

/// GET /api/v1/employees
pub async fn list_employees<R, C>(
    State(state): State<AuthAppState<R, C>>,
    identity: Identity,
) -> AuthResult<Json<Vec<EmployeeResponse>>>
where
    R: EmployeeRepository + Send + Sync + 'static,
    C: RevocationStore + Send + Sync + 'static,
{
    AuthorizationPolicy::check(&identity, Permission::AdminRead)?;

    let employees = EmployeeDirectoryUseCase::new(state.repo.clone()).list().await?;

    Ok(Json(employees.iter().map(EmployeeResponse::from).collect()))
}

/// GET /api/v1/employees/{id}
pub async fn get_employee<R, C>(
    State(state): State<AuthAppState<R, C>>,
    identity: Identity,
    Path(id): Path<String>,
) -> AuthResult<Json<EmployeeResponse>>
where
    R: EmployeeRepository + Send + Sync + 'static,
    C: RevocationStore + Send + Sync + 'static,
{
    AuthorizationPolicy::check(&identity, Permission::AdminRead)?;

    let employee = EmployeeDirectoryUseCase::new(state.repo.clone())
        .get(&parse_employee_id(&id)?)
        .await?;

    Ok(Json(EmployeeResponse::from(&employee)))
}

/// PUT /api/v1/employees/{id}
pub async fn update_employee<R, C>(
    State(state): State<AuthAppState<R, C>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<UpdateEmployeeRequest>,
) -> AuthResult<Json<EmployeeResponse>>
where
    R: EmployeeRepository + Send + Sync + 'static,
    C: RevocationStore + Send + Sync + 'static,
{
    AuthorizationPolicy::check(&identity, Permission::AdminUpdate)?;

    let id = parse_employee_id(&id)?;
    let changes = req
        .into_changes()
        .map_err(|code| AuthError::Validation(format!("Unknown role: {code}")))?;

    let employee = EmployeeDirectoryUseCase::new(state.repo.clone())
        .update(&id, changes)
        .await?;

    Ok(Json(EmployeeResponse::from(&employee)))
}

/// DELETE /api/v1/employees/{id}
pub async fn delete_employee<R, C>(
    State(state): State<AuthAppState<R, C>>,
    identity: Identity,
    Path(id): Path<String>,
) -> AuthResult<StatusCode>
where
    R: EmployeeRepository + Send + Sync + 'static,
    C: RevocationStore + Send + Sync + 'static,
{
    AuthorizationPolicy::check(&identity, Permission::AdminDelete)?;

    EmployeeDirectoryUseCase::new(state.repo.clone())
        .delete(&parse_employee_id(&id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn parse_employee_id(raw: &str) -> AuthResult<EmployeeId> {
    EmployeeId::from_str(raw).map_err(|_| AuthError::Validation("Invalid employee id".to_string()))
}
