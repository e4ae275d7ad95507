//! admin-realtime server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints and the
//! periodic refresher.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use admin_realtime::app_state::AppState;
use admin_realtime::config::RealtimeConfig;
use admin_realtime::persistence::QueryGateway;
use admin_realtime::persistence::memory::InMemoryQueryGateway;
use admin_realtime::persistence::postgres::PgQueryGateway;
use admin_realtime::server::build_app;
use admin_realtime::service::{
    IdentityOnlyVerifier, NonEmptyTokenVerifier, RealtimeService, TokenVerifier,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RealtimeConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(addr = %config.listen_addr, "starting admin-realtime");

    // Build persistence layer
    let gateway: Arc<dyn QueryGateway> = if config.persistence_enabled {
        let pg = PgQueryGateway::connect(&config)
            .await
            .context("failed to connect to PostgreSQL")?;
        tracing::info!(
            max_connections = config.database_max_connections,
            "connected to PostgreSQL"
        );
        Arc::new(pg)
    } else {
        tracing::warn!("persistence disabled, serving from the in-memory store");
        Arc::new(InMemoryQueryGateway::with_default_admin().await)
    };

    let verifier: Arc<dyn TokenVerifier> = if config.auth_require_token {
        Arc::new(NonEmptyTokenVerifier)
    } else {
        tracing::warn!("session tokens are not verified; any token is accepted for an active admin id");
        Arc::new(IdentityOnlyVerifier)
    };

    // Build service layer
    let service = RealtimeService::new(gateway, verifier, &config);
    let refresher = service.refresher(&config).spawn();

    if config.producer_token.is_none() {
        tracing::warn!("PRODUCER_TOKEN is not set; every /api/v1 request will be rejected");
    }
    let state = AppState::new(service).with_producer_token(config.producer_token.clone());
    let app = build_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresher.shutdown().await;
    tracing::info!("server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
