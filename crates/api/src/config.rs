//! Process configuration, read once at startup.

use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Everything the server reads from the environment besides secrets held
/// by the client crates. Defaults suit local development; production
/// overrides via env vars.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (`HOST`, default `0.0.0.0`).
    pub host: String,
    /// Bind port (`PORT`, default `3000`).
    pub port: u16,
    /// Allowed CORS origins (`CORS_ORIGINS`, comma-separated, default
    /// `http://localhost:5173`).
    pub cors_origins: Vec<String>,
    /// Per-request timeout (`REQUEST_TIMEOUT_SECS`, default `30`).
    pub request_timeout_secs: u64,
    /// Jobs executing at once (`JOB_CONCURRENCY`, default `4`).
    pub job_concurrency: usize,
    /// Days terminal job rows survive the retention sweep
    /// (`JOB_RETENTION_DAYS`, default `30`).
    pub job_retention_days: i64,
    /// Give the first registered account the admin role
    /// (`BOOTSTRAP_FIRST_ADMIN`, default `true`).
    pub bootstrap_first_admin: bool,
    /// JWT secret and lifetimes, see [`JwtConfig::from_env`].
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Read the configuration.
    ///
    /// # Panics
    ///
    /// Panics on unparseable numeric overrides and on a missing
    /// `JWT_SECRET`. Startup is the one place a bad environment should
    /// stop the process.
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Treat anything except "false"/"0" as on.
        let bootstrap_first_admin = std::env::var("BOOTSTRAP_FIRST_ADMIN")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_env("PORT", 3000),
            cors_origins,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30),
            job_concurrency: parse_env("JOB_CONCURRENCY", 4),
            job_retention_days: parse_env("JOB_RETENTION_DAYS", 30),
            bootstrap_first_admin,
            jwt: JwtConfig::from_env(),
        }
    }
}

fn parse_env<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid number, got '{raw}'")),
        Err(_) => default,
    }
}
