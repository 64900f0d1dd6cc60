//! rustpress-session server
//!
//! Serves the registration, login and session endpoints.

use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use rustpress_session::telemetry::init_tracing;
use rustpress_session::{create_routes, AuthConfig, AuthService, SqliteAccountStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");

    let config = AuthConfig::from_env()?;
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting rustpress-session"
    );

    let store = SqliteAccountStore::connect(&config.database_url)
        .await
        .context("failed to open account database")?;
    info!(url = %config.database_url, "Account database initialized");

    let bind_address = config.bind_address.clone();
    let cors = cors_layer(&config.cors_origins)?;

    let auth = Arc::new(AuthService::new(Arc::new(store), config)?);

    let mut app = create_routes(auth).layer(TraceLayer::new_for_http());
    if let Some(cors) = cors {
        app = app.layer(cors);
    }

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    info!(address = %bind_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn cors_layer(origins: &[String]) -> anyhow::Result<Option<CorsLayer>> {
    if origins.is_empty() {
        return Ok(None);
    }

    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {}", o)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
