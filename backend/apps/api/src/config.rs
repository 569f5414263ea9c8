//! Server Configuration
//!
//! Environment variables (optionally loaded from `.env`) parsed once at
//! startup. Missing required values abort startup with a clear message.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;
use platform::crypto::from_base64;
use platform::rate_limit::RateLimitConfig;

/// Where logged-out tokens are remembered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationBackend {
    /// Process-local moka cache; single instance only
    Memory,
    /// `revoked_tokens` table shared by every instance
    Postgres,
}

impl FromStr for RevocationBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres),
            other => bail!("REVOCATION_BACKEND must be 'memory' or 'postgres', got '{other}'"),
        }
    }
}

/// Administrator seeded at startup when absent
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub revocation_backend: RevocationBackend,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let bind_addr = optional("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:31113".to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let frontend_origins = optional("FRONTEND_ORIGINS")
            .unwrap_or_else(|| "http://localhost:40922,http://127.0.0.1:40922".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let revocation_backend = optional("REVOCATION_BACKEND")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(RevocationBackend::Memory);

        let bootstrap_admin = match (
            optional("BOOTSTRAP_ADMIN_EMAIL"),
            optional("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => bail!("BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            revocation_backend,
            bootstrap_admin,
            auth: auth_config_from_env()?,
        })
    }
}

fn auth_config_from_env() -> anyhow::Result<AuthConfig> {
    let mut config = match optional("JWT_SECRET") {
        Some(secret_b64) => AuthConfig {
            jwt_secret: from_base64(secret_b64.trim()).context("JWT_SECRET must be base64")?,
            ..AuthConfig::default()
        },
        None if cfg!(debug_assertions) => {
            tracing::warn!(
                "JWT_SECRET not set, using a random key; tokens will not survive a restart"
            );
            AuthConfig::development()
        }
        None => bail!("JWT_SECRET must be set in production"),
    };

    if let Some(issuer) = optional("JWT_ISSUER") {
        config.jwt_issuer = issuer;
    }
    if let Some(ttl) = parse_secs("TOKEN_TTL_SECS")? {
        config.token_ttl = ttl;
        config.revocation_ttl = ttl;
    }
    if let Some(ttl) = parse_secs("REVOCATION_TTL_SECS")? {
        config.revocation_ttl = ttl;
    }
    if let Some(max_requests) = parse_u64("RATE_LIMIT_MAX_REQUESTS")? {
        let window_secs = parse_u64("RATE_LIMIT_WINDOW_SECS")?.unwrap_or(60);
        let max_requests =
            u32::try_from(max_requests).context("RATE_LIMIT_MAX_REQUESTS is too large")?;
        config.rate_limit =
            (max_requests > 0).then(|| RateLimitConfig::new(max_requests, window_secs));
    }
    if let Some(proxies) = optional("TRUSTED_PROXIES") {
        config.trusted_proxies = parse_ip_list(&proxies).context("TRUSTED_PROXIES")?;
    }
    if let Some(pepper) = optional("PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }

    config.validate()?;
    Ok(config)
}

/// Non-empty value of an environment variable
fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_u64(name: &str) -> anyhow::Result<Option<u64>> {
    optional(name)
        .map(|v| v.trim().parse::<u64>().with_context(|| format!("{name} must be an integer")))
        .transpose()
}

/// Comma-separated IP addresses
fn parse_ip_list(value: &str) -> anyhow::Result<Vec<IpAddr>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<IpAddr>()
                .with_context(|| format!("'{entry}' is not an IP address"))
        })
        .collect()
}

fn parse_secs(name: &str) -> anyhow::Result<Option<Duration>> {
    Ok(parse_u64(name)?.map(Duration::from_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revocation_backend_parse() {
        assert_eq!("memory".parse::<RevocationBackend>().unwrap(), RevocationBackend::Memory);
        assert_eq!(" Postgres ".parse::<RevocationBackend>().unwrap(), RevocationBackend::Postgres);
        assert!("redis".parse::<RevocationBackend>().is_err());
    }

    #[test]
    fn test_parse_ip_list() {
        let proxies = parse_ip_list("10.0.0.1, ::1,").unwrap();
        assert_eq!(proxies, vec!["10.0.0.1".parse::<IpAddr>().unwrap(), "::1".parse().unwrap()]);
        assert!(parse_ip_list("10.0.0.0/8").is_err());
    }
}
