//! Auth Middleware
//!
//! Bearer authentication for protected path prefixes, per-client rate
//! limiting, and request paths for handler errors. All are installed with
//! `axum::middleware::from_fn_with_state` or `from_fn`.

use axum::extract::{ConnectInfo, FromRequestParts, OriginalUri, Request, State};
use axum::http::request::Parts;
use axum::http::{Extensions, Uri};
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;

use platform::client::client_key;
use platform::rate_limit::{RateLimitDecision, RateLimitStore};

use crate::application::AuthenticateRequestUseCase;
use crate::domain::entity::identity::Identity;
use crate::domain::repository::{EmployeeRepository, RevocationStore};
use crate::error::{AuthError, PendingInstance};
use crate::presentation::handlers::AuthAppState;

/// Path as the client sent it, even inside a nested router
fn request_path(parts: &Parts) -> String {
    original_path(&parts.extensions, &parts.uri)
}

fn original_path(extensions: &Extensions, uri: &Uri) -> String {
    extensions
        .get::<OriginalUri>()
        .map(|original| original.path().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Middleware that requires a valid bearer token on protected prefixes
///
/// Requests outside the configured prefixes pass through untouched. On
/// success the caller's [`Identity`] is placed in the request extensions.
pub async fn require_bearer_auth<R, C>(
    State(state): State<AuthAppState<R, C>>,
    req: Request,
    next: Next,
) -> Response
where
    R: EmployeeRepository + Send + Sync + 'static,
    C: RevocationStore + Send + Sync + 'static,
{
    let (mut parts, body) = req.into_parts();
    let path = request_path(&parts);

    if !state.config.is_protected(&path) || parts.extensions.get::<Identity>().is_some() {
        return next.run(Request::from_parts(parts, body)).await;
    }

    let use_case = AuthenticateRequestUseCase::new(
        state.repo.clone(),
        state.revocations.clone(),
        state.codec.clone(),
    );

    match use_case.execute(&parts.headers).await {
        Ok(identity) => {
            parts.extensions.insert(identity);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(e) => e.into_response_for(&path),
    }
}

/// Middleware that limits requests per client address
///
/// The key is the socket peer, or the forwarded client when the peer is a
/// configured trusted proxy.
pub async fn rate_limit<R, C>(
    State(state): State<AuthAppState<R, C>>,
    req: Request,
    next: Next,
) -> Response
where
    R: EmployeeRepository + Send + Sync + 'static,
    C: RevocationStore + Send + Sync + 'static,
{
    let Some(limiter) = state.rate_limiter.as_ref() else {
        return next.run(req).await;
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let key = client_key(req.headers(), peer, &state.config.trusted_proxies);

    match limiter.check(&key).await {
        Ok(decision @ RateLimitDecision::Limited { .. }) => {
            let path = original_path(req.extensions(), req.uri());
            tracing::warn!(client = %key, path = %path, "Rate limit exceeded");
            AuthError::RateLimitExceeded {
                retry_after_secs: decision.retry_after_secs().unwrap_or(1),
            }
            .into_response_for(&path)
        }
        Ok(RateLimitDecision::Allowed { .. }) => next.run(req).await,
        Err(e) => {
            // Fail open
            tracing::warn!(error = %e, "Rate limit check failed, allowing request");
            next.run(req).await
        }
    }
}

/// Outermost middleware that adds the request path to handler errors
pub async fn place_problem_instance(req: Request, next: Next) -> Response {
    let path = original_path(req.extensions(), req.uri());
    let mut response = next.run(req).await;

    match response.extensions_mut().remove::<PendingInstance>() {
        Some(pending) => pending.place(&path, response),
        None => response,
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Identity>().cloned().ok_or_else(|| {
            AuthError::TokenInvalid("No authenticated identity".to_string())
                .into_response_for(&request_path(parts))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_identity_extractor_rejects_when_absent() {
        let (mut parts, _) = Request::builder()
            .uri("/api/v1/employees/me")
            .body(Body::empty())
            .unwrap()
            .into_parts();

        let rejection = Identity::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
        assert!(rejection.headers().contains_key("www-authenticate"));
    }

    #[test]
    fn test_request_path_prefers_original_uri() {
        let (mut parts, _) = Request::builder()
            .uri("/me")
            .body(Body::empty())
            .unwrap()
            .into_parts();
        assert_eq!(request_path(&parts), "/me");

        parts
            .extensions
            .insert(OriginalUri("/api/v1/employees/me".parse().unwrap()));
        assert_eq!(request_path(&parts), "/api/v1/employees/me");
    }
}
