//! Process wiring shared by the server and the stand-alone worker.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use devinsight_worker::{Config as WorkerConfig, ExecutorRegistry, TaskScheduler};
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db;
use crate::store::PgTaskStore;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connects to Postgres, retrying with exponential backoff
///
/// The database is often still starting when the process comes up in a
/// container environment.
pub async fn connect_with_retry(database_url: &str, max_connections: u32) -> Result<PgPool> {
    const MAX_RETRIES: u32 = 10;
    const INITIAL_DELAY_MS: u64 = 500;
    const MAX_DELAY_MS: u64 = 30_000;

    let mut attempt = 0;
    let mut delay_ms = INITIAL_DELAY_MS;

    loop {
        attempt += 1;

        match db::create_pool(database_url, max_connections).await {
            Ok(pool) => {
                if attempt > 1 {
                    info!("Connected to database after {} attempt(s)", attempt);
                }
                return Ok(pool);
            }
            Err(e) if attempt < MAX_RETRIES => {
                warn!(
                    "Database connection attempt {}/{} failed: {}. Retrying in {}ms...",
                    attempt, MAX_RETRIES, e, delay_ms
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                delay_ms = (delay_ms * 2).min(MAX_DELAY_MS);
            }
            Err(e) => {
                return Err(e).context(format!(
                    "Failed to connect to database after {} attempts",
                    MAX_RETRIES
                ));
            }
        }
    }
}

/// Builds a scheduler backed by the Postgres task store
pub fn build_scheduler(pool: PgPool, config: WorkerConfig) -> Result<TaskScheduler> {
    let registry = ExecutorRegistry::with_defaults(config.simulated_latency);
    let store = Arc::new(PgTaskStore::new(pool));

    info!(
        "Scheduler {} configured: poll_interval={:?}, batch_size={}, max_parallel_tasks={}",
        config.worker_id, config.poll_interval, config.batch_size, config.max_parallel_tasks
    );

    TaskScheduler::new(config, store, registry)
}

/// Runs a scheduler in the background until `shutdown` is cancelled
pub fn spawn_scheduler(
    pool: PgPool,
    config: WorkerConfig,
    shutdown: CancellationToken,
) -> Result<JoinHandle<()>> {
    let scheduler = build_scheduler(pool, config)?;
    Ok(tokio::spawn(async move { scheduler.run(shutdown).await }))
}

/// Waits for ctrl-c and then cancels `token`
pub async fn wait_for_shutdown(token: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
            }
            token.cancel();
        }
        _ = token.cancelled() => {}
    }
}
