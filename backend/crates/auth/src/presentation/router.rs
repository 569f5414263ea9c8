//! Auth Router

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use std::sync::Arc;

use platform::rate_limit::GovernorRateLimitStore;

use crate::application::config::AuthConfig;
use crate::domain::repository::{EmployeeRepository, RevocationStore};
use crate::infra::jwt::JwtTokenCodec;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{place_problem_instance, rate_limit, require_bearer_auth};

/// Create the API router with PostgreSQL for both employees and revocations
pub fn api_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    api_router_generic(repo.clone(), repo, config)
}

/// Create the API router for any repository and revocation store
///
/// Routes are registered with their full paths so the protected-prefix
/// check sees the same path the client sent.
pub fn api_router_generic<R, C>(repo: R, revocations: C, config: AuthConfig) -> Router
where
    R: EmployeeRepository + Send + Sync + 'static,
    C: RevocationStore + Send + Sync + 'static,
{
    let rate_limiter = config
        .rate_limit
        .as_ref()
        .map(|limit| Arc::new(GovernorRateLimitStore::new(limit)));

    let state = AuthAppState {
        repo: Arc::new(repo),
        revocations: Arc::new(revocations),
        codec: Arc::new(JwtTokenCodec::from_config(&config)),
        config: Arc::new(config),
        rate_limiter,
    };

    // Credential endpoints are the ones worth throttling
    let credentials = Router::new()
        .route("/api/v1/auth/register", post(handlers::register::<R, C>))
        .route("/api/v1/auth/login", post(handlers::login::<R, C>))
        .route("/api/v1/auth/authenticate", post(handlers::login::<R, C>))
        .route_layer(from_fn_with_state(state.clone(), rate_limit::<R, C>));

    Router::new()
        .merge(credentials)
        .route("/api/v1/auth/logout", post(handlers::logout::<R, C>))
        .route("/api/v1/employees", get(handlers::list_employees::<R, C>))
        .route("/api/v1/employees/me", get(handlers::me::<R, C>))
        .route(
            "/api/v1/employees/{id}",
            get(handlers::get_employee::<R, C>)
                .put(handlers::update_employee::<R, C>)
                .delete(handlers::delete_employee::<R, C>),
        )
        .layer(from_fn_with_state(state.clone(), require_bearer_auth::<R, C>))
        .layer(from_fn(place_problem_instance))
        .with_state(state)
}
