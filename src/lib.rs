//! RustPress Session
//!
//! Username/email/password authentication for RustPress providing:
//! - Account registration with unique username and email
//! - Login by username or email issuing a JWT bearer token
//! - Argon2id password hashing
//! - Session restoration from a bearer token
//! - A session client with persisted token, session state machine and
//!   route guard for front ends
//!
//! # Configuration
//!
//! All server configuration is loaded from environment variables:
//! - `JWT_SECRET` - Secret key for signing JWTs (required, min 32 chars)
//! - `JWT_ACCESS_EXPIRATION` - Token expiration in seconds (default: 1800)
//! - `JWT_ISSUER` - JWT issuer claim (default: "rustpress-session")
//! - `DATABASE_URL` - SQLite connection string (default: "sqlite://accounts.db?mode=rwc")
//! - `BIND_ADDRESS` - HTTP listen address (default: "127.0.0.1:8000")
//! - `CORS_ORIGINS` - Comma separated allowed origins (default: none)
//!
//! # Usage
//!
//! ```rust,ignore
//! use rustpress_session::{AuthConfig, AuthService, SqliteAccountStore};
//!
//! let config = AuthConfig::from_env()?;
//! config.validate()?;
//!
//! let store = SqliteAccountStore::connect(&config.database_url).await?;
//! let auth = Arc::new(AuthService::new(Arc::new(store), config)?);
//! let app = rustpress_session::create_routes(auth);
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod service;
pub mod store;
pub mod telemetry;

// Re-export commonly used types
pub use config::AuthConfig;
pub use credentials::Credentials;
pub use error::{AuthError, ConflictField, StoreError, TokenError};
pub use extractors::CurrentAccount;
pub use handlers::{create_routes, AuthState};
pub use models::*;
pub use service::AuthService;
pub use store::{AccountStore, SqliteAccountStore};
