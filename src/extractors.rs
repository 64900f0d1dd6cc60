//! Authentication Extractors
//!
//! Axum extractors for the bearer session and request bodies.

use crate::error::AuthError;
use crate::models::{Account, LoginRequest, SessionClaims};
use crate::service::AuthService;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    Form, Json,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Pull the bearer token out of the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AuthError::Unauthorized("Not authenticated".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            AuthError::Unauthorized("Invalid authorization header format".to_string())
        })?
        .trim();

    if token.is_empty() {
        return Err(AuthError::Unauthorized("Not authenticated".to_string()));
    }

    Ok(token)
}

/// The account behind the request's bearer token
///
/// Reuses claims stored by [`crate::middleware::require_session`] when the
/// route is layered, otherwise verifies the header itself.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

#[async_trait]
impl FromRequestParts<Arc<AuthService>> for CurrentAccount {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        auth: &Arc<AuthService>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<SessionClaims>() {
            return auth.account_for_claims(claims).await.map(CurrentAccount);
        }

        let token = bearer_token(&parts.headers)?;
        auth.current_account(token).await.map(CurrentAccount)
    }
}

/// JSON body whose rejections surface as validation errors (400)
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AuthError::Validation(e.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// Login credentials as JSON or as an OAuth2 password-flow form
#[derive(Debug, Clone)]
pub struct LoginPayload(pub LoginRequest);

#[async_trait]
impl<S> FromRequest<S> for LoginPayload
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            let Form(login) = Form::<LoginRequest>::from_request(req, state)
                .await
                .map_err(|e| AuthError::Validation(e.body_text()))?;
            return Ok(LoginPayload(login));
        }

        let ApiJson(login) = ApiJson::<LoginRequest>::from_request(req, state).await?;
        Ok(LoginPayload(login))
    }
}
