//! Session state machine.
//!
//! [`SessionContext`] is the single owner of the client-side session. Views
//! receive a [`watch::Receiver`] from [`SessionContext::subscribe`] instead
//! of reaching for global state.

use super::api::SessionApi;
use super::storage::TokenStorage;
use super::ClientError;
use crate::models::{AccountResponse, RegisterRequest};

use tokio::sync::watch;

/// Client-side session state
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Persisted token not yet checked
    Unknown,
    Anonymous,
    Authenticated {
        account: AccountResponse,
        token: String,
    },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }

    pub fn account(&self) -> Option<&AccountResponse> {
        match self {
            SessionState::Authenticated { account, .. } => Some(account),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }
}

/// Owner of the session state and the persisted token
pub struct SessionContext<A, S> {
    api: A,
    storage: S,
    state: watch::Sender<SessionState>,
}

impl<A, S> SessionContext<A, S>
where
    A: SessionApi,
    S: TokenStorage,
{
    /// New context in the `Unknown` state; call [`initialize`](Self::initialize) next
    pub fn new(api: A, storage: S) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            api,
            storage,
            state,
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn transition(&self, next: SessionState) {
        tracing::debug!(
            authenticated = next.is_authenticated(),
            "Session state transition"
        );
        self.state.send_replace(next);
    }

    fn become_anonymous(&mut self) -> Result<(), ClientError> {
        let cleared = self.storage.clear();
        self.transition(SessionState::Anonymous);
        cleared
    }

    /// Restore the session from the persisted token
    ///
    /// Any failure discards the token.
    pub async fn initialize(&mut self) -> SessionState {
        let token = match self.storage.load() {
            Some(token) => token,
            None => {
                self.transition(SessionState::Anonymous);
                return self.state();
            }
        };

        match self.api.me(&token).await {
            Ok(account) => {
                self.transition(SessionState::Authenticated { account, token });
            }
            Err(e) => {
                tracing::info!("Persisted session rejected: {}", e);
                if let Err(e) = self.become_anonymous() {
                    tracing::warn!("Failed to clear persisted token: {}", e);
                }
            }
        }

        self.state()
    }

    /// Log in, persist the token and load the account
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<AccountResponse, ClientError> {
        let issued = self.api.login(username, password).await?;
        self.storage.save(&issued.access_token)?;

        match self.api.me(&issued.access_token).await {
            Ok(account) => {
                self.transition(SessionState::Authenticated {
                    account: account.clone(),
                    token: issued.access_token,
                });
                Ok(account)
            }
            Err(e) => {
                self.become_anonymous()?;
                Err(e)
            }
        }
    }

    /// Register, then log in with the same credentials
    pub async fn register(&mut self, req: RegisterRequest) -> Result<AccountResponse, ClientError> {
        self.api.register(&req).await?;
        self.login(&req.username, &req.password).await
    }

    /// Forget the token and the account
    pub fn logout(&mut self) -> Result<(), ClientError> {
        tracing::debug!("Logging out");
        self.become_anonymous()
    }

    /// Re-check the current token with the server
    ///
    /// An `Unauthorized` answer (typically an expired token) ends the
    /// session. Other failures leave the state as it was.
    pub async fn revalidate(&mut self) -> Result<AccountResponse, ClientError> {
        let token = match self.storage.load() {
            Some(token) => token,
            None => {
                self.transition(SessionState::Anonymous);
                return Err(ClientError::Unauthorized("Not authenticated".to_string()));
            }
        };

        match self.api.me(&token).await {
            Ok(account) => {
                self.transition(SessionState::Authenticated {
                    account: account.clone(),
                    token,
                });
                Ok(account)
            }
            Err(e) if e.is_unauthorized() => {
                self.become_anonymous()?;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}
