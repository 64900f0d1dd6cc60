//! Authentication Service
//!
//! Registration, login and session restoration on top of the credential
//! store and the credential service.

use crate::config::AuthConfig;
use crate::credentials::Credentials;
use crate::error::{AuthError, ConflictField, StoreError};
use crate::models::*;
use crate::store::AccountStore;

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Authentication service
pub struct AuthService {
    store: Arc<dyn AccountStore>,
    credentials: Credentials,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(store: Arc<dyn AccountStore>, config: AuthConfig) -> Result<Self, AuthError> {
        let credentials = Credentials::new(&config)?;

        Ok(Self {
            store,
            credentials,
            config,
        })
    }

    /// Get reference to the credential service
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    // ============================================
    // Password Hashing
    // ============================================

    /// Hash a password off the async executor
    pub async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let credentials = self.credentials.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || credentials.hash_password(&password))
            .await
            .map_err(|e| {
                tracing::error!("Password hashing task failed: {:?}", e);
                AuthError::Internal
            })?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let credentials = self.credentials.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || credentials.verify_password(&password, &hash))
            .await
            .map_err(|e| {
                tracing::error!("Password verification task failed: {:?}", e);
                AuthError::Internal
            })
    }

    // ============================================
    // Registration
    // ============================================

    /// Register a new account
    ///
    /// Username collisions are reported before email collisions.
    pub async fn register(&self, req: RegisterRequest) -> Result<AccountResponse, AuthError> {
        req.validate()?;

        if self.find(self.store.get_by_username(&req.username).await)?.is_some() {
            return Err(AuthError::Conflict(ConflictField::Username));
        }

        if self.find(self.store.get_by_email(&req.email).await)?.is_some() {
            return Err(AuthError::Conflict(ConflictField::Email));
        }

        let password_hash = self.hash_password(&req.password).await?;

        // The unique constraints still catch a concurrent registration
        let account = self
            .store
            .create(NewAccount {
                username: req.username,
                email: req.email,
                password_hash,
            })
            .await?;

        tracing::info!(account_id = %account.id, "Account registered");
        Ok(AccountResponse::from(account))
    }

    // ============================================
    // Login
    // ============================================

    /// Authenticate by username or email and issue a session token
    ///
    /// Unknown account, wrong password and inactive account all produce the
    /// same rejection so callers cannot probe which accounts exist.
    pub async fn login(&self, req: LoginRequest) -> Result<TokenResponse, AuthError> {
        let account = match self.find(self.store.get_by_username(&req.username).await)? {
            Some(account) => Some(account),
            None => self.find(self.store.get_by_email(&req.username).await)?,
        };

        let account = match account {
            Some(account) => account,
            None => {
                self.verify_password(&req.password, self.credentials.decoy_hash())
                    .await?;
                tracing::debug!("Login rejected: unknown account");
                return Err(AuthError::invalid_credentials());
            }
        };

        if !self
            .verify_password(&req.password, &account.password_hash)
            .await?
        {
            tracing::debug!(account_id = %account.id, "Login rejected: wrong password");
            return Err(AuthError::invalid_credentials());
        }

        if !account.can_login() {
            tracing::debug!(account_id = %account.id, "Login rejected: account inactive");
            return Err(AuthError::invalid_credentials());
        }

        let issued = self
            .credentials
            .issue_token(account.id, self.config.access_token_expiration)?;

        tracing::info!(account_id = %account.id, "Login succeeded");
        Ok(TokenResponse::from(issued))
    }

    // ============================================
    // Session Restoration
    // ============================================

    /// Resolve the account behind a bearer token
    pub async fn current_account(&self, token: &str) -> Result<Account, AuthError> {
        let claims = self.credentials.verify_token(token).map_err(|e| {
            tracing::debug!("Session token rejected: {}", e);
            AuthError::from(e)
        })?;

        self.account_for_claims(&claims).await
    }

    /// Resolve the account named by already-verified claims
    pub async fn account_for_claims(&self, claims: &SessionClaims) -> Result<Account, AuthError> {
        let account = self
            .find(self.store.get_by_id(claims.sub).await)?
            .ok_or_else(|| {
                tracing::debug!(account_id = %claims.sub, "Session for missing account");
                AuthError::invalid_session()
            })?;

        if !account.can_login() {
            return Err(AuthError::Unauthorized(
                "User account is inactive".to_string(),
            ));
        }

        Ok(account)
    }

    // ============================================
    // Account Management
    // ============================================

    /// Get account by ID
    pub async fn get_account(&self, id: Uuid) -> Result<Option<Account>, AuthError> {
        self.find(self.store.get_by_id(id).await)
    }

    /// Apply a partial update to an account
    pub async fn update_account(
        &self,
        id: Uuid,
        changes: AccountUpdate,
    ) -> Result<Account, AuthError> {
        changes.validate()?;

        let account = self.store.update(id, changes).await?;
        tracing::info!(account_id = %id, "Account updated");
        Ok(account)
    }

    /// Activate or deactivate an account
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Account, AuthError> {
        self.update_account(id, AccountUpdate::activation(is_active))
            .await
    }

    /// Replace an account password
    pub async fn change_password(&self, id: Uuid, password: &str) -> Result<Account, AuthError> {
        PasswordChange {
            password: password.to_owned(),
        }
        .validate()?;

        let password_hash = self.hash_password(password).await?;
        self.update_account(
            id,
            AccountUpdate {
                password_hash: Some(password_hash),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete an account
    pub async fn delete_account(&self, id: Uuid) -> Result<(), AuthError> {
        self.store.delete(id).await?;
        tracing::info!(account_id = %id, "Account deleted");
        Ok(())
    }

    /// Turn a store lookup into `Ok(None)` when the row is absent
    fn find(&self, result: Result<Account, StoreError>) -> Result<Option<Account>, AuthError> {
        match result {
            Ok(account) => Ok(Some(account)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
