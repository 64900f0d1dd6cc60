//! Authentication Error Types
//!
//! Centralized error handling for the credential store, the credential
//! service and the HTTP layer.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Unique account field involved in a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Username,
    Email,
}

impl ConflictField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictField::Username => "username",
            ConflictField::Email => "email",
        }
    }
}

impl std::fmt::Display for ConflictField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credential store errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Duplicate {0}")]
    DuplicateKey(ConflictField),

    #[error("Account not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                // SQLite reports "UNIQUE constraint failed: accounts.<column>"
                let field = if db_err.message().contains("email") {
                    ConflictField::Email
                } else {
                    ConflictField::Username
                };
                StoreError::DuplicateKey(field)
            }
            other => {
                tracing::error!("Database error: {:?}", other);
                StoreError::Database(other.to_string())
            }
        }
    }
}

/// Session token verification failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    InvalidSignature,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        tracing::debug!("JWT error: {:?}", err);
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        }
    }
}

/// Authentication errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{} already registered", capitalize(.0.as_str()))]
    Conflict(ConflictField),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Account not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal,
}

impl AuthError {
    /// Rejection used for every failed login attempt
    pub fn invalid_credentials() -> Self {
        AuthError::Unauthorized("Incorrect username or password".to_string())
    }

    /// Rejection used for every failed session check
    pub fn invalid_session() -> Self {
        AuthError::Unauthorized("Could not validate credentials".to_string())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            AuthError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                msg.clone(),
            ),
            AuthError::Conflict(field) => (
                StatusCode::CONFLICT,
                match field {
                    ConflictField::Username => "username_exists",
                    ConflictField::Email => "email_exists",
                },
                self.to_string(),
            ),
            AuthError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                msg.clone(),
            ),
            AuthError::NotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                self.to_string(),
            ),
            AuthError::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration_error",
                msg.clone(),
            ),
            AuthError::Database(_) | AuthError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": error_code,
            "message": message
        }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(field) => AuthError::Conflict(field),
            StoreError::NotFound => AuthError::NotFound,
            StoreError::Database(msg) => AuthError::Database(msg),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(_: TokenError) -> Self {
        AuthError::invalid_session()
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AuthError::Internal
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(err: validator::ValidationErrors) -> Self {
        AuthError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_messages_name_the_field() {
        assert_eq!(
            AuthError::Conflict(ConflictField::Username).to_string(),
            "Username already registered"
        );
        assert_eq!(
            AuthError::Conflict(ConflictField::Email).to_string(),
            "Email already registered"
        );
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AuthError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                AuthError::Conflict(ConflictField::Email),
                StatusCode::CONFLICT,
            ),
            (AuthError::invalid_credentials(), StatusCode::UNAUTHORIZED),
            (AuthError::NotFound, StatusCode::NOT_FOUND),
            (AuthError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_unauthorized_carries_bearer_challenge() {
        let response = AuthError::invalid_session().into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_store_errors_map_to_auth_errors() {
        assert!(matches!(
            AuthError::from(StoreError::DuplicateKey(ConflictField::Username)),
            AuthError::Conflict(ConflictField::Username)
        ));
        assert!(matches!(
            AuthError::from(StoreError::NotFound),
            AuthError::NotFound
        ));
    }

    #[test]
    fn test_token_errors_collapse_to_unauthorized() {
        for err in [
            TokenError::Expired,
            TokenError::Malformed,
            TokenError::InvalidSignature,
        ] {
            assert!(matches!(AuthError::from(err), AuthError::Unauthorized(_)));
        }
    }
}
