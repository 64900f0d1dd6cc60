//! Authentication HTTP Handlers
//!
//! REST API endpoints for authentication operations.

use crate::error::AuthError;
use crate::extractors::{ApiJson, CurrentAccount, LoginPayload};
use crate::middleware;
use crate::models::*;
use crate::service::AuthService;

use axum::{
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Shared auth service state
pub type AuthState = Arc<AuthService>;

// ============================================
// Route Builder
// ============================================

/// Create authentication routes
pub fn create_routes(auth_service: Arc<AuthService>) -> Router {
    // Public routes (no authentication required)
    let public = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login));

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/auth/me", get(get_current_account))
        .layer(axum_middleware::from_fn_with_state(
            auth_service.clone(),
            middleware::require_session,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(auth_service)
}

// ============================================
// Registration
// ============================================

/// POST /auth/register
///
/// Register a new account
pub async fn register(
    State(auth): State<AuthState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let account = auth.register(req).await?;

    Ok((StatusCode::CREATED, Json(account)))
}

// ============================================
// Login
// ============================================

/// POST /auth/login
///
/// Authenticate with username or email and return a bearer token
pub async fn login(
    State(auth): State<AuthState>,
    LoginPayload(req): LoginPayload,
) -> Result<impl IntoResponse, AuthError> {
    let response = auth.login(req).await?;

    Ok(Json(response))
}

// ============================================
// Session
// ============================================

/// GET /auth/me
///
/// Get the account behind the bearer token
pub async fn get_current_account(
    CurrentAccount(account): CurrentAccount,
) -> Result<impl IntoResponse, AuthError> {
    Ok(Json(AccountResponse::from(account)))
}
