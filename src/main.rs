//! faucet-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use faucet_gateway::api;
use faucet_gateway::app_state::AppState;
use faucet_gateway::clock::{Clock, SystemClock};
use faucet_gateway::config::FaucetConfig;
use faucet_gateway::persistence::{FaucetStore, MemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = FaucetConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        addr = %config.listen_addr,
        persistence = config.persistence_enabled,
        "starting faucet-gateway"
    );

    let store = build_store(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let app_state = AppState::from_parts(store, clock, &config).context("invalid faucet settings")?;

    let app = api::build_app(app_state, Duration::from_secs(config.request_timeout_secs));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn build_store(config: &FaucetConfig) -> anyhow::Result<Arc<dyn FaucetStore>> {
    if config.persistence_enabled {
        let store = PostgresStore::connect(config)
            .await
            .context("connecting to PostgreSQL")?;
        store.migrate().await.context("running migrations")?;
        tracing::info!("using PostgreSQL store");
        return Ok(Arc::new(store));
    }

    let store = MemoryStore::new();
    for (telegram_id, level) in &config.seed_users {
        store.register(*telegram_id, *level, Decimal::ZERO).await?;
    }
    tracing::warn!(seeded = config.seed_users.len(), "persistence disabled, using in-memory store");
    Ok(Arc::new(store))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
