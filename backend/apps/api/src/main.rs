//! PetWell staff directory API server
//!
//! Startup failures surface through `anyhow`; request errors are rendered by
//! the auth crate as problem documents.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use auth::application::{RegisterInput, RegisterUseCase};
use auth::domain::value_object::role::Role;
use auth::{AuthConfig, AuthError, JwtTokenCodec, MokaRevocationStore, PgAuthRepository};
use axum::{
    Router, http,
    http::{Method, header},
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{BootstrapAdmin, RevocationBackend, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "petwell_api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let repo = PgAuthRepository::new(pool.clone());

    // Startup cleanup: remove expired revocations
    // Errors here should not prevent server startup
    if let Err(e) = repo.cleanup_expired().await {
        tracing::warn!(
            error = %e,
            "Revocation cleanup failed, continuing anyway"
        );
    }

    if let Some(admin) = &config.bootstrap_admin {
        seed_admin(&repo, &config.auth, admin).await;
    }

    tracing::info!(
        backend = ?config.revocation_backend,
        token_ttl_secs = config.auth.token_ttl.as_secs(),
        rate_limited = config.auth.rate_limit.is_some(),
        "Auth configured"
    );

    let api = match config.revocation_backend {
        RevocationBackend::Memory => auth::api_router_generic(
            repo,
            MokaRevocationStore::with_capacity(config.auth.revocation_capacity),
            config.auth,
        ),
        RevocationBackend::Postgres => auth::api_router(repo, config.auth),
    };

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .expose_headers([header::WWW_AUTHENTICATE, header::RETRY_AFTER]);

    // Build router
    let app = Router::new()
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Create the configured administrator unless the email is already taken
///
/// Failures are logged and never stop the server.
async fn seed_admin(repo: &PgAuthRepository, auth: &AuthConfig, admin: &BootstrapAdmin) {
    let use_case = RegisterUseCase::new(
        Arc::new(repo.clone()),
        Arc::new(JwtTokenCodec::from_config(auth)),
        Arc::new(auth.clone()),
    );

    let input = RegisterInput {
        first_name: "Clinic".to_string(),
        last_name: "Administrator".to_string(),
        email: admin.email.clone(),
        password: admin.password.clone(),
        job_title: None,
    };

    match use_case.execute_with_role(input, Role::Admin).await {
        Ok(output) => {
            tracing::info!(employee_id = %output.employee.id, "Bootstrap administrator created");
        }
        Err(AuthError::EntityAlreadyExists(_)) => {
            tracing::debug!("Bootstrap administrator already present");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Bootstrap administrator not created, continuing anyway");
        }
    }
}
