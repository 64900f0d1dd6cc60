//! Authentication Middleware
//!
//! Bearer token validation for protected routes.

use crate::error::AuthError;
use crate::extractors::bearer_token;
use crate::handlers::AuthState;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Require a valid session token
///
/// Verifies the bearer token from the Authorization header and stores the
/// claims in request extensions for use by extractors.
pub async fn require_session(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = {
        let token = bearer_token(req.headers())?;
        auth.credentials().verify_token(token).map_err(|e| {
            tracing::debug!("Session token rejected: {}", e);
            AuthError::from(e)
        })?
    };

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
