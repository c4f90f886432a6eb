//! Postgres task store
//!
//! Adapts the task repository to the [`TaskStore`] contract used by the
//! scheduler.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use devinsight_core::domain::task::Task;
use devinsight_core::store::{Result, StoreError, TaskStore};
use sqlx::PgPool;

use crate::repository::task_repository;

/// [`TaskStore`] backed by the `ai_tasks` table
#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::backend(other),
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn find_runnable(&self, limit: usize) -> Result<Vec<Task>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        task_repository::find_runnable(&self.pool, limit)
            .await
            .map_err(store_error)
    }

    async fn claim(&self, task_id: i64, now: DateTime<Utc>) -> Result<u64> {
        task_repository::claim(&self.pool, task_id, now)
            .await
            .map_err(store_error)
    }

    async fn finalize_success(&self, task_id: i64, result: &str, now: DateTime<Utc>) -> Result<u64> {
        task_repository::finalize_success(&self.pool, task_id, result, now)
            .await
            .map_err(store_error)
    }

    async fn finalize_failure(&self, task_id: i64, error: &str, now: DateTime<Utc>) -> Result<u64> {
        task_repository::finalize_failure(&self.pool, task_id, error, now)
            .await
            .map_err(store_error)
    }

    async fn fail_stale(
        &self,
        started_before: DateTime<Utc>,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        task_repository::fail_stale(&self.pool, started_before, message, now)
            .await
            .map_err(store_error)
    }
}
