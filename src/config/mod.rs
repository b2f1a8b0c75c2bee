//! Application configuration loaded from environment.

use std::net::SocketAddr;

/// Signing secret used when `SECRET_KEY` is unset. Only fit for local development.
pub const DEFAULT_SECRET: &str = "dev-secret-change-me";
/// Token lifetime used when `JWT_EXPIRY_MINUTES` is unset or not a number.
pub const DEFAULT_EXPIRY_MINUTES: i64 = 60;
/// Longest accepted token lifetime (one year). Larger values are capped.
pub const MAX_EXPIRY_MINUTES: i64 = 365 * 24 * 60;

/// Application configuration loaded from `.env` and environment variables.
///
/// Built once in `main` and handed to the services that need it; nothing
/// below `main` reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:3001`).
    pub server_addr: SocketAddr,
    /// PostgreSQL connection URL. `None` selects the in-memory user store.
    pub database_url: Option<String>,
    /// HS256 signing secret for access tokens.
    pub secret_key: String,
    /// Access token lifetime in minutes (at least 1).
    pub jwt_expiry_minutes: i64,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3001".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());
        let secret_key = lookup("SECRET_KEY")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SECRET.to_string());
        let jwt_expiry_minutes = parse_expiry_minutes(lookup("JWT_EXPIRY_MINUTES").as_deref());
        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_addr,
            database_url,
            secret_key,
            jwt_expiry_minutes,
            cors_origins,
            log_level,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET
    }
}

/// Parse the token lifetime. Missing or non-numeric values fall back to the
/// default; values are clamped to `1..=MAX_EXPIRY_MINUTES`.
pub fn parse_expiry_minutes(raw: Option<&str>) -> i64 {
    match raw.map(str::trim).map(str::parse::<i64>) {
        Some(Ok(value)) => value.clamp(1, MAX_EXPIRY_MINUTES),
        _ => DEFAULT_EXPIRY_MINUTES,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
}
