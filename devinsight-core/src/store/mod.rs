//! Task store contract
//!
//! The scheduler only ever talks to persistence through [`TaskStore`].
//! Correctness under several concurrent schedulers rests entirely on
//! [`TaskStore::claim`] being an atomic conditional update.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::task::Task;

pub use memory::InMemoryTaskStore;

/// Errors raised by a task store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or is in an unusable state
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other backend error
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Backend(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence operations the scheduler depends on
///
/// Only the caller that won [`TaskStore::claim`] may finalize a task, and
/// finalizing the same task twice is not supported. Finalize operations only
/// touch tasks that are still `running`, so a task already failed by
/// [`TaskStore::fail_stale`] keeps that outcome.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Up to `limit` pending tasks, oldest `created_at` first.
    ///
    /// Gives no exclusivity; a returned task may already be claimed by the
    /// time the caller acts on it.
    async fn find_runnable(&self, limit: usize) -> Result<Vec<Task>>;

    /// Moves a task from `pending` to `running` and stamps `started_at`,
    /// only if it is still `pending`.
    ///
    /// Returns the number of rows affected: 1 if this caller now owns the
    /// task, 0 if another worker got there first.
    async fn claim(&self, task_id: i64, now: DateTime<Utc>) -> Result<u64>;

    /// Marks a claimed task `success` with its result payload.
    ///
    /// Returns 0 if the task is no longer `running`.
    async fn finalize_success(&self, task_id: i64, result: &str, now: DateTime<Utc>)
    -> Result<u64>;

    /// Marks a claimed task `failed` with an error message.
    ///
    /// Returns 0 if the task is no longer `running`.
    async fn finalize_failure(&self, task_id: i64, error: &str, now: DateTime<Utc>)
    -> Result<u64>;

    /// Fails every `running` task whose `started_at` is before
    /// `started_before`. Returns the number of tasks swept.
    async fn fail_stale(
        &self,
        started_before: DateTime<Utc>,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<u64>;
}
