//! DevInsight Server
//!
//! Serves the project and task API and, unless disabled, runs a task
//! scheduler in the same process.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use devinsight_server::config::Config;
use devinsight_server::{api, db, runtime};

#[tokio::main]
async fn main() -> Result<()> {
    runtime::init_tracing("devinsight_server=debug,devinsight_worker=info,tower_http=debug");

    info!("Starting DevInsight Server...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    info!("Connecting to database...");
    let pool = runtime::connect_with_retry(&config.database_url, config.max_connections).await?;
    info!("Database connection pool created");

    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let shutdown = CancellationToken::new();

    let scheduler = if config.scheduler_enabled {
        Some(runtime::spawn_scheduler(
            pool.clone(),
            config.worker.clone(),
            shutdown.clone(),
        )?)
    } else {
        info!("Embedded scheduler disabled");
        None
    };

    let app = api::create_router(pool);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(runtime::wait_for_shutdown(shutdown.clone()))
        .await
        .context("Server error")?;

    shutdown.cancel();

    if let Some(handle) = scheduler {
        info!("Waiting for scheduler to finish its current tick");
        if let Err(e) = handle.await {
            error!("Scheduler task failed: {}", e);
        }
    }

    info!("Server stopped");
    Ok(())
}
