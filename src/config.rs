//! Authentication Configuration
//!
//! All configuration values are loaded from environment variables once at
//! startup. No hardcoded secrets or sensitive data.

use crate::error::AuthError;
use std::env;
use std::str::FromStr;

/// Longest accepted session token lifetime (one year, in seconds)
pub const MAX_ACCESS_TOKEN_EXPIRATION: i64 = 365 * 24 * 60 * 60;

/// Authentication configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT secret key for signing tokens (from JWT_SECRET env var)
    pub jwt_secret: String,

    /// Access token expiration in seconds (from JWT_ACCESS_EXPIRATION env var)
    pub access_token_expiration: i64,

    /// JWT issuer (from JWT_ISSUER env var)
    pub jwt_issuer: String,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Account database connection string (from DATABASE_URL env var)
    pub database_url: String,

    /// Listen address for the HTTP server (from BIND_ADDRESS env var)
    pub bind_address: String,

    /// Allowed CORS origins, comma separated (from CORS_ORIGINS env var)
    pub cors_origins: Vec<String>,
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AuthConfig {
    /// Load configuration from environment variables
    ///
    /// Fails with [`AuthError::Config`] if `JWT_SECRET` is not set.
    pub fn from_env() -> Result<Self, AuthError> {
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| {
            AuthError::Config("JWT_SECRET environment variable must be set".to_string())
        })?;

        Ok(Self {
            jwt_secret,

            access_token_expiration: parse_or("JWT_ACCESS_EXPIRATION", 1800), // 30 minutes

            jwt_issuer: env::var("JWT_ISSUER")
                .unwrap_or_else(|_| "rustpress-session".to_string()),

            argon2_memory_cost: parse_or("ARGON2_MEMORY_COST", 19456), // 19 MiB

            argon2_time_cost: parse_or("ARGON2_TIME_COST", 2),

            argon2_parallelism: parse_or("ARGON2_PARALLELISM", 1),

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://accounts.db?mode=rwc".to_string()),

            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "127.0.0.1:8000".to_string()),

            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Configuration with the given secret and library defaults
    ///
    /// Used by tests and embedders that do not read the environment.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            access_token_expiration: 1800,
            jwt_issuer: "rustpress-session".to_string(),
            argon2_memory_cost: 19456,
            argon2_time_cost: 2,
            argon2_parallelism: 1,
            database_url: "sqlite::memory:".to_string(),
            bind_address: "127.0.0.1:8000".to_string(),
            cors_origins: Vec::new(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < 32 {
            return Err(AuthError::Config(
                "JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }

        if self.access_token_expiration <= 0 {
            return Err(AuthError::Config(
                "JWT_ACCESS_EXPIRATION must be positive".to_string(),
            ));
        }

        if self.access_token_expiration > MAX_ACCESS_TOKEN_EXPIRATION {
            return Err(AuthError::Config(format!(
                "JWT_ACCESS_EXPIRATION must not exceed {} seconds",
                MAX_ACCESS_TOKEN_EXPIRATION
            )));
        }

        argon2::Params::new(
            self.argon2_memory_cost,
            self.argon2_time_cost,
            self.argon2_parallelism,
            None,
        )
        .map_err(|e| AuthError::Config(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(())
    }
}
