//! Stand-alone task worker
//!
//! Runs only the task scheduler against the shared database. Any number of
//! workers may run next to the server; the conditional claim keeps each
//! task to a single execution.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use devinsight_server::config::Config;
use devinsight_server::{db, runtime};

#[tokio::main]
async fn main() -> Result<()> {
    runtime::init_tracing("devinsight_server=info,devinsight_worker=debug");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    info!("Starting task worker {}", config.worker.worker_id);

    let pool = runtime::connect_with_retry(&config.database_url, config.max_connections).await?;

    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let shutdown = CancellationToken::new();
    let scheduler = runtime::build_scheduler(pool, config.worker)?;

    tokio::spawn(runtime::wait_for_shutdown(shutdown.clone()));

    scheduler.run(shutdown).await;

    info!("Task worker stopped");
    Ok(())
}
