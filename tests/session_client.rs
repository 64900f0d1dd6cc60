//! # Session Client Integration Tests
//!
//! Runs the server on an ephemeral port and drives [`SessionContext`] over
//! real HTTP with a file-backed token store.

mod common;

use reqwest::StatusCode;

use rustpress_session::client::{
    route_guard, ClientError, FileTokenStorage, GuardDecision, SessionApi, SessionClient,
    SessionContext, SessionState, TokenStorage, LOGIN_PATH,
};
use rustpress_session::RegisterRequest;

fn alice() -> RegisterRequest {
    RegisterRequest {
        username: "alice".into(),
        email: "alice@x.com".into(),
        password: "secret1".into(),
    }
}

#[tokio::test]
async fn test_register_login_restore_logout() {
    let base_url = common::spawn_server(common::test_service().await).await;
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("session.json");

    // Fresh browser: nothing persisted
    let mut ctx = SessionContext::new(
        SessionClient::new(&base_url),
        FileTokenStorage::new(&token_file),
    );
    assert_eq!(route_guard(&ctx.state()), GuardDecision::Loading);
    assert_eq!(ctx.initialize().await, SessionState::Anonymous);
    assert_eq!(
        route_guard(&ctx.state()),
        GuardDecision::Redirect { to: LOGIN_PATH }
    );

    // Registration logs in implicitly
    let account = ctx.register(alice()).await.unwrap();
    assert_eq!(account.username, "alice");
    assert_eq!(route_guard(&ctx.state()), GuardDecision::Render);
    assert!(ctx.storage().load().is_some());

    // Reload: the persisted token restores the session
    let mut reloaded = SessionContext::new(
        SessionClient::new(&base_url),
        FileTokenStorage::new(&token_file),
    );
    let restored = reloaded.initialize().await;
    assert_eq!(restored.account().map(|a| a.id), Some(account.id));

    // Logout clears the persisted token
    reloaded.logout().unwrap();
    assert_eq!(reloaded.state(), SessionState::Anonymous);
    assert_eq!(FileTokenStorage::new(&token_file).load(), None);

    // Without a token the API refuses
    let response = reqwest::get(format!("{}/auth/me", base_url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_errors_are_typed() {
    let base_url = common::spawn_server(common::test_service().await).await;
    let client = SessionClient::new(&base_url);

    client.register(&alice()).await.unwrap();

    let conflict = client.register(&alice()).await.unwrap_err();
    assert_eq!(
        conflict,
        ClientError::Conflict("Username already registered".into())
    );

    let invalid = client
        .register(&RegisterRequest {
            username: "x".into(),
            ..alice()
        })
        .await
        .unwrap_err();
    assert!(matches!(invalid, ClientError::Validation(_)));

    let unauthorized = client.login("alice", "wrong").await.unwrap_err();
    assert_eq!(
        unauthorized,
        ClientError::Unauthorized("Incorrect username or password".into())
    );

    let token = client.login("alice@x.com", "secret1").await.unwrap();
    assert_eq!(token.token_type, "bearer");
    assert_eq!(client.me(&token.access_token).await.unwrap().username, "alice");
}

#[tokio::test]
async fn test_stale_persisted_token_is_discarded() {
    let auth = common::test_service().await;
    let base_url = common::spawn_server(auth.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("session.json");

    let mut ctx = SessionContext::new(
        SessionClient::new(&base_url),
        FileTokenStorage::new(&token_file),
    );
    ctx.initialize().await;
    let account = ctx.register(alice()).await.unwrap();

    // The account disappears server side; the next check ends the session
    auth.delete_account(account.id).await.unwrap();
    let err = ctx.revalidate().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(
        route_guard(&ctx.state()),
        GuardDecision::Redirect { to: LOGIN_PATH }
    );

    let mut reloaded = SessionContext::new(
        SessionClient::new(&base_url),
        FileTokenStorage::new(&token_file),
    );
    assert_eq!(reloaded.initialize().await, SessionState::Anonymous);
}
