//! Murmur Server: notification fan-out over WebSocket and Web Push.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use murmur_auth::{CredentialVerifier, JwtDecoder};
use murmur_core::config::{AppConfig, DatabaseProvider};
use murmur_core::error::AppError;
use murmur_database::{DatabasePool, MemoryStore, Stores};
use murmur_push::PushDeliveryClient;
use murmur_realtime::RealtimeEngine;

#[tokio::main]
async fn main() {
    let env = std::env::var("MURMUR_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Murmur v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stores ───────────────────────────────────────────
    let (stores, db_pool) = match config.database.provider {
        DatabaseProvider::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::connect(&config.database).await?;
            if config.database.run_migrations {
                tracing::info!("Running database migrations...");
                murmur_database::migration::run_migrations(pool.pool()).await?;
                tracing::info!("Database migrations complete");
            }
            (Stores::postgres(pool.pool().clone()), Some(pool))
        }
        DatabaseProvider::Memory => {
            tracing::warn!("Using in-memory stores; data is lost on restart");
            (Stores::memory(Arc::new(MemoryStore::new())), None)
        }
    };

    // ── Step 2: Auth ─────────────────────────────────────────────
    let verifier: Arc<dyn CredentialVerifier> = Arc::new(JwtDecoder::new(&config.auth));

    // ── Step 3: Push delivery ────────────────────────────────────
    let push = Arc::new(PushDeliveryClient::new(
        &config.push,
        Arc::clone(&stores.subscriptions),
    )?);

    // ── Step 4: Realtime engine ──────────────────────────────────
    let engine = RealtimeEngine::new(
        config.realtime.clone(),
        &stores,
        Arc::clone(&verifier),
        push,
    );

    // ── Step 5: Build and start HTTP server ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = murmur_api::AppState::new(
        config,
        stores,
        db_pool.clone(),
        verifier,
        engine.clone(),
    );
    let app = murmur_api::build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Murmur server listening on {}", addr);

    // ── Step 6: Graceful shutdown ────────────────────────────────
    let signal_engine = engine.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            signal_engine.connections.close_all();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 7: Drain deliveries and close the pool ──────────────
    if !engine.shutdown(grace).await {
        tracing::warn!("Some deliveries were abandoned at shutdown");
    }
    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("Murmur server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
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
}
