//! Task poller
//!
//! Scans the task store for pending tasks, claims them, runs the matching
//! executor and records the outcome. Each claimed task runs in its own tokio
//! task; a failure while handling one task never aborts the rest of the batch.

use anyhow::{Context, Result};
use chrono::Utc;
use devinsight_core::domain::task::Task;
use devinsight_core::store::TaskStore;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::TickSummary;
use crate::config::Config;
use crate::executor::{ExecutionError, ExecutorRegistry};

/// What happened to a single task during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskOutcome {
    /// Another worker claimed the task first
    LostRace,
    Succeeded,
    Failed,
}

/// Periodic scan-claim-execute-finalize loop over a [`TaskStore`]
pub struct TaskScheduler {
    config: Config,
    store: Arc<dyn TaskStore>,
    registry: Arc<ExecutorRegistry>,
    semaphore: Arc<Semaphore>,
}

impl TaskScheduler {
    /// Creates a new scheduler
    ///
    /// Fails if `config` does not pass [`Config::validate`]; in particular a
    /// zero `max_parallel_tasks` would leave every tick waiting on a permit.
    pub fn new(
        config: Config,
        store: Arc<dyn TaskStore>,
        registry: ExecutorRegistry,
    ) -> Result<Self> {
        config
            .validate()
            .context("Invalid scheduler configuration")?;

        let semaphore = Arc::new(Semaphore::new(config.max_parallel_tasks));
        Ok(Self {
            config,
            store,
            registry: Arc::new(registry),
            semaphore,
        })
    }

    /// Runs ticks until `shutdown` is cancelled
    ///
    /// The delay is measured from the end of one tick to the start of the
    /// next, so slow ticks never overlap. Cancellation is only observed
    /// between ticks: a tick in progress always runs to completion.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(
            "Starting task scheduler {} (interval: {:?}, batch size: {})",
            self.config.worker_id, self.config.poll_interval, self.config.batch_size
        );

        while !shutdown.is_cancelled() {
            match self.tick().await {
                Ok(summary) => {
                    if summary.claimed > 0 || summary.swept > 0 {
                        info!(
                            "Tick finished: {} claimed, {} succeeded, {} failed, {} skipped, {} errored, {} swept",
                            summary.claimed,
                            summary.succeeded,
                            summary.failed,
                            summary.skipped,
                            summary.errored,
                            summary.swept
                        );
                    }
                }
                Err(e) => {
                    error!("Error during scheduler tick: {:#}", e);
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = time::sleep(self.config.poll_interval) => {}
            }
        }

        info!("Task scheduler {} stopped", self.config.worker_id);
    }

    /// Performs a single scan-claim-execute-finalize cycle
    ///
    /// Only a failure to fetch the batch is returned as an error; faults
    /// while handling an individual task are logged and counted in
    /// [`TickSummary::errored`].
    pub async fn tick(&self) -> Result<TickSummary> {
        let mut summary = TickSummary::default();

        if let Some(stale_after) = self.config.stale_after {
            summary.swept = self.sweep_stale(stale_after).await;
        }

        let tasks = self
            .store
            .find_runnable(self.config.batch_size)
            .await
            .context("Failed to fetch runnable tasks")?;
        summary.fetched = tasks.len();

        if tasks.is_empty() {
            debug!("No pending tasks");
            return Ok(summary);
        }

        info!("Found {} pending task(s)", tasks.len());

        let mut handles = Vec::with_capacity(tasks.len());

        for task in tasks {
            let task_id = task.id;
            let permit = Arc::clone(&self.semaphore)
                .acquire_owned()
                .await
                .context("Task semaphore closed")?;
            let store = Arc::clone(&self.store);
            let registry = Arc::clone(&self.registry);
            let timeout = self.config.execution_timeout;

            let handle = tokio::spawn(async move {
                let outcome = Self::process_task(store, registry, task, timeout).await;
                drop(permit);
                outcome
            });
            handles.push((task_id, handle));
        }

        for (task_id, handle) in handles {
            match handle.await {
                Ok(Ok(TaskOutcome::LostRace)) => summary.skipped += 1,
                Ok(Ok(TaskOutcome::Succeeded)) => {
                    summary.claimed += 1;
                    summary.succeeded += 1;
                }
                Ok(Ok(TaskOutcome::Failed)) => {
                    summary.claimed += 1;
                    summary.failed += 1;
                }
                Ok(Err(e)) => {
                    summary.errored += 1;
                    error!("Error while handling task {}: {:#}", task_id, e);
                }
                Err(e) => {
                    summary.errored += 1;
                    error!("Handler for task {} panicked: {}", task_id, e);
                }
            }
        }

        Ok(summary)
    }

    /// Claims a single task and, if the claim is won, executes and finalizes it
    async fn process_task(
        store: Arc<dyn TaskStore>,
        registry: Arc<ExecutorRegistry>,
        task: Task,
        timeout: Option<Duration>,
    ) -> Result<TaskOutcome> {
        let claimed = store
            .claim(task.id, Utc::now())
            .await
            .context("Failed to claim task")?;

        if claimed == 0 {
            debug!("Task {} already claimed by another worker", task.id);
            return Ok(TaskOutcome::LostRace);
        }

        info!(
            "Starting task {} (type {}, project {})",
            task.id, task.task_type, task.project_id
        );

        match Self::execute(&registry, &task, timeout).await {
            Ok(result) => {
                let updated = store
                    .finalize_success(task.id, &result, Utc::now())
                    .await
                    .context("Failed to record task success")?;
                if updated == 0 {
                    warn!("Task {} was no longer running when it succeeded", task.id);
                }
                info!("Task {} succeeded", task.id);
                Ok(TaskOutcome::Succeeded)
            }
            Err(err) => {
                let message = err.failure_message();
                let updated = store
                    .finalize_failure(task.id, &message, Utc::now())
                    .await
                    .context("Failed to record task failure")?;
                if updated == 0 {
                    warn!("Task {} was no longer running when it failed", task.id);
                }
                warn!("Task {} failed: {}", task.id, message);
                Ok(TaskOutcome::Failed)
            }
        }
    }

    /// Runs the executor registered for the task's type
    ///
    /// The executor runs on its own tokio task so that a panic becomes an
    /// [`ExecutionError::Panicked`] instead of leaving the task running.
    async fn execute(
        registry: &ExecutorRegistry,
        task: &Task,
        timeout: Option<Duration>,
    ) -> std::result::Result<String, ExecutionError> {
        let executor = registry.resolve(&task.task_type)?;
        let input = task.input_data.clone();

        let handle = tokio::spawn(async move { executor.execute(&input).await });

        let joined = match timeout {
            Some(limit) => {
                let abort = handle.abort_handle();
                match time::timeout(limit, handle).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        abort.abort();
                        return Err(ExecutionError::TimedOut(limit));
                    }
                }
            }
            None => handle.await,
        };

        joined.unwrap_or_else(|e| Err(join_error_to_execution_error(e)))
    }

    /// Fails running tasks older than `stale_after`; returns how many
    async fn sweep_stale(&self, stale_after: Duration) -> u64 {
        let now = Utc::now();
        let Some(cutoff) = chrono::TimeDelta::from_std(stale_after)
            .ok()
            .and_then(|age| now.checked_sub_signed(age))
        else {
            warn!("Stale threshold {:?} is out of range, skipping sweep", stale_after);
            return 0;
        };

        let message = format!(
            "task exceeded maximum running time of {}s",
            stale_after.as_secs()
        );

        match self.store.fail_stale(cutoff, &message, now).await {
            Ok(swept) => {
                if swept > 0 {
                    warn!("Failed {} task(s) stuck in running", swept);
                }
                swept
            }
            Err(e) => {
                error!("Failed to sweep stale tasks: {}", e);
                0
            }
        }
    }
}

fn join_error_to_execution_error(err: JoinError) -> ExecutionError {
    if err.is_panic() {
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_default();
        ExecutionError::Panicked(message)
    } else {
        ExecutionError::Failed("executor task was cancelled".to_string())
    }
}
