//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Employee principal, roles and permissions, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - JWT codec, revocation caches, repository implementations
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Employee registration and email + password login
//! - Stateless HS256 bearer tokens with server-side revocation on logout
//! - Role-based permissions (Client, Manager, Admin) with 401/403 separation
//! - Administrative employee directory
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional application pepper
//! - Token subject, expiry and issuer checked against the current principal
//! - Authorities resolved from the stored role on every request
//! - Per-client rate limiting on credential endpoints

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::entity::identity::Identity;
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryEmployeeRepository, JwtTokenCodec, MokaRevocationStore, PgAuthRepository};
pub use presentation::router::{api_router, api_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
