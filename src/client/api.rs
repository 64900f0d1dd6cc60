//! HTTP client for the session API.

use super::ClientError;
use crate::models::{AccountResponse, LoginRequest, RegisterRequest, TokenResponse};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Calls the session context makes against the server
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn register(&self, req: &RegisterRequest) -> Result<AccountResponse, ClientError>;

    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ClientError>;

    async fn me(&self, token: &str) -> Result<AccountResponse, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// reqwest-backed [`SessionApi`]
#[derive(Debug, Clone)]
pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
}

impl SessionClient {
    /// Client for the API mounted at `base_url` (e.g. `http://127.0.0.1:8000`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| status.to_string());

        tracing::debug!(status = %status, "Session API rejected request: {}", message);

        Err(match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(message)
            }
            StatusCode::CONFLICT => ClientError::Conflict(message),
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            _ => ClientError::Unexpected(message),
        })
    }
}

#[async_trait]
impl SessionApi for SessionClient {
    async fn register(&self, req: &RegisterRequest) -> Result<AccountResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(req)
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ClientError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn me(&self, token: &str) -> Result<AccountResponse, ClientError> {
        let response = self
            .http
            .get(self.url("/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse(response).await
    }
}
