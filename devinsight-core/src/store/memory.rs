//! In-memory task store
//!
//! Mutex-guarded map of tasks. Every conditional update runs inside a single
//! critical section, which gives the same per-task atomicity a database
//! gives the conditional `UPDATE`. Used by tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Result, StoreError, TaskStore};
use crate::domain::task::{Task, TaskStatus};
use crate::dto::task::NewTask;

#[derive(Default)]
struct Inner {
    next_id: i64,
    tasks: BTreeMap<i64, Task>,
}

/// Thread-safe in-memory implementation of [`TaskStore`]
#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryTaskStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    /// Inserts a new `pending` task created now
    pub fn insert(&self, task: NewTask) -> Result<Task> {
        self.insert_at(task, Utc::now())
    }

    /// Inserts a new `pending` task with an explicit creation time
    pub fn insert_at(&self, task: NewTask, created_at: DateTime<Utc>) -> Result<Task> {
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let id = inner.next_id;

        let task = Task {
            id,
            project_id: task.project_id,
            user_id: task.user_id,
            task_type: task.task_type,
            status: TaskStatus::Pending,
            input_data: task.input_data,
            result_data: None,
            error_message: None,
            created_at,
            started_at: None,
            completed_at: None,
        };
        inner.tasks.insert(id, task.clone());

        Ok(task)
    }

    /// Looks up a task by ID
    pub fn get(&self, id: i64) -> Result<Option<Task>> {
        Ok(self.lock()?.tasks.get(&id).cloned())
    }

    /// All tasks, by ID
    pub fn all(&self) -> Result<Vec<Task>> {
        Ok(self.lock()?.tasks.values().cloned().collect())
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn find_runnable(&self, limit: usize) -> Result<Vec<Task>> {
        let inner = self.lock()?;

        let mut pending: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.status == TaskStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|t| (t.created_at, t.id));
        pending.truncate(limit);

        Ok(pending)
    }

    async fn claim(&self, task_id: i64, now: DateTime<Utc>) -> Result<u64> {
        let mut inner = self.lock()?;

        match inner.tasks.get_mut(&task_id) {
            Some(task) if task.status.can_transition_to(TaskStatus::Running) => {
                task.status = TaskStatus::Running;
                task.started_at = Some(now);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn finalize_success(
        &self,
        task_id: i64,
        result: &str,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let mut inner = self.lock()?;

        let Some(task) = inner
            .tasks
            .get_mut(&task_id)
            .filter(|t| t.status.can_transition_to(TaskStatus::Success))
        else {
            return Ok(0);
        };
        task.status = TaskStatus::Success;
        task.result_data = Some(result.to_string());
        task.completed_at = Some(now);

        Ok(1)
    }

    async fn finalize_failure(
        &self,
        task_id: i64,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let mut inner = self.lock()?;

        let Some(task) = inner
            .tasks
            .get_mut(&task_id)
            .filter(|t| t.status.can_transition_to(TaskStatus::Failed))
        else {
            return Ok(0);
        };
        task.status = TaskStatus::Failed;
        task.error_message = Some(error.to_string());
        task.completed_at = Some(now);

        Ok(1)
    }

    async fn fail_stale(
        &self,
        started_before: DateTime<Utc>,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let mut inner = self.lock()?;
        let mut swept = 0;

        for task in inner.tasks.values_mut() {
            let stale = task.status == TaskStatus::Running
                && task.started_at.is_some_and(|started| started < started_before);
            if stale {
                task.status = TaskStatus::Failed;
                task.error_message = Some(message.to_string());
                task.completed_at = Some(now);
                swept += 1;
            }
        }

        Ok(swept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::TaskType;
    use chrono::Duration;

    fn new_task(task_type: TaskType) -> NewTask {
        NewTask {
            project_id: 1,
            user_id: 1,
            task_type,
            input_data: "{}".to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_runnable_returns_oldest_pending_first() {
        let store = InMemoryTaskStore::new();
        let base = Utc::now();

        let newest = store
            .insert_at(new_task(TaskType::LogSummary), base)
            .unwrap();
        let oldest = store
            .insert_at(new_task(TaskType::LogSummary), base - Duration::seconds(30))
            .unwrap();
        let middle = store
            .insert_at(new_task(TaskType::LogSummary), base - Duration::seconds(10))
            .unwrap();
        let claimed = store
            .insert_at(new_task(TaskType::LogSummary), base - Duration::seconds(60))
            .unwrap();
        store.claim(claimed.id, base).await.unwrap();

        let runnable = store.find_runnable(10).await.unwrap();
        let ids: Vec<i64> = runnable.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![oldest.id, middle.id, newest.id]);
        assert!(runnable.iter().all(|t| t.status == TaskStatus::Pending));

        let limited = store.find_runnable(2).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, oldest.id);
    }

    #[tokio::test]
    async fn test_claim_only_succeeds_once() {
        let store = InMemoryTaskStore::new();
        let task = store.insert(new_task(TaskType::LogSummary)).unwrap();
        let now = Utc::now();

        assert_eq!(store.claim(task.id, now).await.unwrap(), 1);
        assert_eq!(store.claim(task.id, now).await.unwrap(), 0);

        let stored = store.get(task.id).unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Running);
        assert_eq!(stored.started_at, Some(now));
    }

    #[tokio::test]
    async fn test_claim_unknown_task_affects_nothing() {
        let store = InMemoryTaskStore::new();
        assert_eq!(store.claim(42, Utc::now()).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_have_single_winner() {
        let store = InMemoryTaskStore::new();

        for _ in 0..50 {
            let task = store.insert(new_task(TaskType::LogSummary)).unwrap();
            let barrier = Arc::new(tokio::sync::Barrier::new(2));

            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let store = store.clone();
                    let barrier = Arc::clone(&barrier);
                    tokio::spawn(async move {
                        barrier.wait().await;
                        store.claim(task.id, Utc::now()).await.unwrap()
                    })
                })
                .collect();

            let mut total = 0;
            for handle in handles {
                total += handle.await.unwrap();
            }
            assert_eq!(total, 1, "task {} claimed {} times", task.id, total);
        }
    }

    #[tokio::test]
    async fn test_finalize_sets_exclusive_outcome_fields() {
        let store = InMemoryTaskStore::new();
        let ok = store.insert(new_task(TaskType::LogSummary)).unwrap();
        let bad = store.insert(new_task(TaskType::LogSummary)).unwrap();
        let now = Utc::now();

        store.claim(ok.id, now).await.unwrap();
        store.claim(bad.id, now).await.unwrap();
        store
            .finalize_success(ok.id, r#"{"ok":true}"#, now)
            .await
            .unwrap();
        store.finalize_failure(bad.id, "boom", now).await.unwrap();

        let ok = store.get(ok.id).unwrap().unwrap();
        assert_eq!(ok.status, TaskStatus::Success);
        assert_eq!(ok.result_data.as_deref(), Some(r#"{"ok":true}"#));
        assert!(ok.error_message.is_none());
        assert_eq!(ok.completed_at, Some(now));

        let bad = store.get(bad.id).unwrap().unwrap();
        assert_eq!(bad.status, TaskStatus::Failed);
        assert_eq!(bad.error_message.as_deref(), Some("boom"));
        assert!(bad.result_data.is_none());
        assert_eq!(bad.completed_at, Some(now));
    }

    #[tokio::test]
    async fn test_finalize_requires_running_task() {
        let store = InMemoryTaskStore::new();
        let task = store.insert(new_task(TaskType::LogSummary)).unwrap();
        let now = Utc::now();

        assert_eq!(store.finalize_success(task.id, "{}", now).await.unwrap(), 0);
        assert_eq!(
            store.get(task.id).unwrap().unwrap().status,
            TaskStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_terminal_tasks_never_move_again() {
        let store = InMemoryTaskStore::new();
        let task = store.insert(new_task(TaskType::LogSummary)).unwrap();
        let now = Utc::now();

        store.claim(task.id, now).await.unwrap();
        assert_eq!(store.finalize_failure(task.id, "boom", now).await.unwrap(), 1);

        assert_eq!(store.claim(task.id, now).await.unwrap(), 0);
        assert_eq!(store.finalize_success(task.id, "{}", now).await.unwrap(), 0);
        assert_eq!(store.finalize_failure(task.id, "again", now).await.unwrap(), 0);

        let stored = store.get(task.id).unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Failed);
        assert_eq!(stored.error_message.as_deref(), Some("boom"));
        assert!(stored.result_data.is_none());
    }

    #[tokio::test]
    async fn test_fail_stale_only_touches_old_running_tasks() {
        let store = InMemoryTaskStore::new();
        let now = Utc::now();

        let old = store.insert(new_task(TaskType::LogSummary)).unwrap();
        let fresh = store.insert(new_task(TaskType::LogSummary)).unwrap();
        let pending = store.insert(new_task(TaskType::LogSummary)).unwrap();
        store
            .claim(old.id, now - Duration::minutes(45))
            .await
            .unwrap();
        store.claim(fresh.id, now).await.unwrap();

        let swept = store
            .fail_stale(now - Duration::minutes(30), "stuck", now)
            .await
            .unwrap();
        assert_eq!(swept, 1);

        assert_eq!(
            store.get(old.id).unwrap().unwrap().status,
            TaskStatus::Failed
        );
        assert_eq!(
            store.get(fresh.id).unwrap().unwrap().status,
            TaskStatus::Running
        );
        assert_eq!(
            store.get(pending.id).unwrap().unwrap().status,
            TaskStatus::Pending
        );
    }
}
