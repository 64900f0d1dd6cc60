//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rustpress_session::{AuthConfig, AuthService, SqliteAccountStore};

pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-must-be-at-least-32-chars";

/// Configuration with cheap Argon2 parameters
pub fn test_config() -> AuthConfig {
    AuthConfig {
        argon2_memory_cost: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        ..AuthConfig::with_secret(TEST_SECRET)
    }
}

/// Auth service over a fresh in-memory store
pub async fn test_service() -> Arc<AuthService> {
    let store = SqliteAccountStore::in_memory()
        .await
        .expect("Failed to open in-memory store");

    Arc::new(AuthService::new(Arc::new(store), test_config()).expect("Failed to build service"))
}

/// Serve the auth routes on an ephemeral port, returning the base URL
pub async fn spawn_server(auth: Arc<AuthService>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        axum::serve(listener, rustpress_session::create_routes(auth))
            .await
            .expect("Test server failed");
    });

    format!("http://{}", addr)
}
