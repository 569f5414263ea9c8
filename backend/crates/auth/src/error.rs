//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, conversions::sqlx_error_kind, kind::ErrorKind};
use thiserror::Error;

use crate::domain::token::TokenError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login failed. Same shape whether or not the email exists.
    #[error("Invalid email or password")]
    BadCredentials,

    /// Missing, malformed, expired, forged or revoked bearer token
    #[error("Authentication required: {0}")]
    TokenInvalid(String),

    /// Account flags forbid use (disabled, locked, expired)
    #[error("Account is disabled")]
    AccountDisabled,

    #[error("{0} not found")]
    EntityNotFound(String),

    #[error("An account with email {0} already exists")]
    EntityAlreadyExists(String),

    /// Authenticated, but lacking the named permission
    #[error("Missing required permission: {0}")]
    AccessDenied(String),

    #[error("Too many requests")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::BadCredentials | AuthError::TokenInvalid(_) | AuthError::AccountDisabled => {
                ErrorKind::Unauthorized
            }
            AuthError::EntityNotFound(_) => ErrorKind::NotFound,
            AuthError::EntityAlreadyExists(_) => ErrorKind::Conflict,
            AuthError::AccessDenied(_) => ErrorKind::Forbidden,
            AuthError::RateLimitExceeded { .. } => ErrorKind::TooManyRequests,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Database(e) => match sqlx_error_kind(e) {
                ErrorKind::ServiceUnavailable => ErrorKind::ServiceUnavailable,
                ErrorKind::Conflict => ErrorKind::Conflict,
                _ => ErrorKind::InternalServerError,
            },
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side details never reach the response body.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Database(_) if self.kind() == ErrorKind::Conflict => {
                AppError::conflict("Request conflicts with existing data")
            }
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::new(self.kind(), "An unexpected error occurred")
            }
            AuthError::TokenInvalid(_) => AppError::new(self.kind(), "Authentication required")
                .with_action("Sign in again to obtain a new access token"),
            AuthError::RateLimitExceeded { retry_after_secs } => {
                AppError::new(self.kind(), self.to_string())
                    .with_action(format!("Retry after {retry_after_secs} seconds"))
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::BadCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::TokenInvalid(reason) => {
                tracing::debug!(reason = %reason, "Rejected bearer token");
            }
            AuthError::RateLimitExceeded { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Rate limit exceeded");
            }
            AuthError::AccountDisabled
            | AuthError::EntityNotFound(_)
            | AuthError::EntityAlreadyExists(_)
            | AuthError::AccessDenied(_)
            | AuthError::Validation(_) => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }

    /// Render as a response whose problem body names the request path
    pub fn into_response_for(self, path: &str) -> Response {
        self.render(Some(path))
    }

    fn render(self, instance: Option<&str>) -> Response {
        self.log();

        let app_error = self.to_app_error();
        let pending = instance.is_none().then(|| PendingInstance::from(&app_error));
        let app_error = match instance {
            Some(path) => app_error.with_instance(path),
            None => app_error,
        };
        let mut response = app_error.into_response();

        match &self {
            AuthError::TokenInvalid(_) => {
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    platform::bearer::www_authenticate_challenge(),
                );
            }
            AuthError::RateLimitExceeded { retry_after_secs } => {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, header::HeaderValue::from(*retry_after_secs));
            }
            _ => {}
        }
        if let Some(pending) = pending {
            response.extensions_mut().insert(pending);
        }
        response
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.render(None)
    }
}

/// Problem rendered by a handler, before the request path is known
///
/// Travels in the response extensions until the router's outer layer
/// re-renders it with `instance` set.
#[derive(Debug, Clone)]
pub(crate) struct PendingInstance {
    kind: ErrorKind,
    detail: String,
    action: Option<String>,
}

impl From<&AppError> for PendingInstance {
    fn from(err: &AppError) -> Self {
        Self {
            kind: err.kind(),
            detail: err.message().to_string(),
            action: err.action().map(str::to_string),
        }
    }
}

impl PendingInstance {
    /// Re-render at `path`, keeping every header of `rendered` except the body's
    pub(crate) fn place(self, path: &str, rendered: Response) -> Response {
        let mut app_error = AppError::new(self.kind, self.detail).with_instance(path);
        if let Some(action) = self.action {
            app_error = app_error.with_action(action);
        }

        let (parts, _) = rendered.into_parts();
        let mut placed = app_error.into_response();
        *placed.status_mut() = parts.status;
        for (name, value) in &parts.headers {
            if *name != header::CONTENT_TYPE && *name != header::CONTENT_LENGTH {
                placed.headers_mut().append(name.clone(), value.clone());
            }
        }
        placed
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(msg) => AuthError::Internal(msg),
            other => AuthError::TokenInvalid(other.to_string()),
        }
    }
}

impl From<platform::bearer::BearerError> for AuthError {
    fn from(err: platform::bearer::BearerError) -> Self {
        AuthError::TokenInvalid(err.to_string())
    }
}

impl From<crate::domain::value_object::email::EmailError> for AuthError {
    fn from(err: crate::domain::value_object::email::EmailError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AuthError::BadCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::TokenInvalid("expired".into()), StatusCode::UNAUTHORIZED),
            (AuthError::AccountDisabled, StatusCode::UNAUTHORIZED),
            (AuthError::AccessDenied("admin:read".into()), StatusCode::FORBIDDEN),
            (AuthError::EntityNotFound("Employee".into()), StatusCode::NOT_FOUND),
            (AuthError::EntityAlreadyExists("a@x.com".into()), StatusCode::CONFLICT),
            (AuthError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                AuthError::RateLimitExceeded { retry_after_secs: 3 },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (AuthError::Database(sqlx::Error::PoolTimedOut), StatusCode::SERVICE_UNAVAILABLE),
            (AuthError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
        }
    }

    #[test]
    fn test_token_error_conversion() {
        assert!(matches!(
            AuthError::from(TokenError::Expired),
            AuthError::TokenInvalid(_)
        ));
        assert!(matches!(
            AuthError::from(TokenError::Encoding("key".into())),
            AuthError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn test_token_invalid_response_has_challenge_and_no_reason() {
        let response = AuthError::TokenInvalid("signature mismatch".into())
            .into_response_for("/api/v1/employees");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "Authentication required");
        assert_eq!(body["instance"], "/api/v1/employees");
        assert!(!body.to_string().contains("signature"));
    }

    #[test]
    fn test_rate_limit_response_has_retry_after() {
        let response = AuthError::RateLimitExceeded { retry_after_secs: 42 }.into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }

    #[tokio::test]
    async fn test_pending_instance_is_placed_later() {
        let response = AuthError::RateLimitExceeded { retry_after_secs: 7 }.into_response();
        let pending = response
            .extensions()
            .get::<PendingInstance>()
            .cloned()
            .unwrap();

        let placed = pending.place("/api/v1/auth/login", response);
        assert_eq!(placed.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(placed.headers()[header::RETRY_AFTER], "7");
        assert_eq!(
            placed.headers()[header::CONTENT_TYPE],
            "application/problem+json"
        );

        let bytes = to_bytes(placed.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["instance"], "/api/v1/auth/login");
        assert_eq!(body["action"], "Retry after 7 seconds");
    }

    #[test]
    fn test_path_aware_render_needs_no_placing() {
        let response = AuthError::AccessDenied("admin:read".into()).into_response_for("/x");
        assert!(response.extensions().get::<PendingInstance>().is_none());
    }

    #[test]
    fn test_internal_details_hidden() {
        let app_error = AuthError::Internal("key file missing".into()).to_app_error();
        assert_eq!(app_error.message(), "An unexpected error occurred");
    }
}
