// Pulse analytics API server
// Decision: Postgres by default; STORAGE_MODE=memory runs without a database

use std::sync::Arc;

use anyhow::{Context, Result};
use pulse_api::{build_app, config::ApiConfig, open_store};
use pulse_storage::{StoreConfig, StoreHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    if let Ok(path) = dotenvy::dotenv() {
        eprintln!("Loaded .env from {}", path.display());
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pulse_api=debug,pulse_storage=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("pulse-api starting...");

    let config = ApiConfig::from_env().context("Invalid API configuration")?;
    let store_config = StoreConfig::from_env().context("Invalid storage configuration")?;
    tracing::info!(
        mode = ?store_config.mode,
        timeout_ms = store_config.query_timeout.as_millis() as u64,
        "Storage configured"
    );

    let store = Arc::new(StoreHandle::new(store_config));
    open_store(&store)
        .await
        .context("Analytics store is misconfigured")?;

    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }
    if config.cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS origins configured");
    }

    let app = build_app(store.clone(), &config);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;
    tracing::info!("Listening on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    store.close().await;
    tracing::info!("pulse-api stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
