//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, counter store setup, the audit worker, and
//! the Axum server lifecycle.

use crate::config::Config;
use crate::domain::audit_worker::run_audit_worker;
use crate::domain::repositories::AuditRepository;
use crate::infrastructure::counter::{CounterStore, MemoryCounterStore, RedisCounterStore};
use crate::infrastructure::persistence::PgAuditRepository;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const MEMORY_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis counter store (or the process-local fallback)
/// - Background audit worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;

    let counter_store = connect_counter_store(&config).await;

    let pool = Arc::new(pool);
    let (audit_tx, audit_rx) = mpsc::channel(config.audit_queue_capacity);
    let audit_repository: Arc<dyn AuditRepository> =
        Arc::new(PgAuditRepository::new(pool.clone()));
    let audit_worker = tokio::spawn(run_audit_worker(audit_rx, audit_repository));

    let state = AppState::new(pool, counter_store, audit_tx, &config);
    let app = app_router(state, &config);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router (and every audit sender it holds) is gone; let the worker
    // drain what is left.
    if let Err(e) = audit_worker.await {
        tracing::error!(error = %e, "Audit worker terminated abnormally");
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_database(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

async fn connect_counter_store(config: &Config) -> Arc<dyn CounterStore> {
    if let Some(redis_url) = &config.redis_url {
        match RedisCounterStore::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Counter store enabled (Redis)");
                return Arc::new(redis);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Falling back to process-local counters.",
                    e
                );
            }
        }
    } else {
        tracing::info!("Redis not configured, using process-local counters");
    }

    tracing::warn!("Limits are enforced per instance only");
    let store = Arc::new(MemoryCounterStore::new());

    let sweeper = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(MEMORY_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.purge_expired();
        }
    });

    store
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
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

    tracing::info!("Shutdown signal received");
}
