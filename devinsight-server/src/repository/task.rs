//! Task Repository
//!
//! Handles all database operations related to tasks, including the
//! conditional updates the scheduler relies on.

use chrono::{DateTime, Utc};
use devinsight_core::domain::task::{Task, TaskStatus, TaskType};
use devinsight_core::dto::task::NewTask;
use sqlx::PgPool;

const TASK_COLUMNS: &str = r#"
    id, project_id, user_id, task_type, status, input_data, result_data,
    error_message, created_at, started_at, completed_at
"#;

/// Insert a new pending task
pub async fn create(pool: &PgPool, task: NewTask) -> Result<Task, sqlx::Error> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        r#"
        INSERT INTO ai_tasks (project_id, user_id, task_type, status, input_data, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {TASK_COLUMNS}
        "#
    ))
    .bind(task.project_id)
    .bind(task.user_id)
    .bind(task.task_type.as_str())
    .bind(TaskStatus::Pending.as_str())
    .bind(&task.input_data)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    row.try_into()
}

/// Find a task by ID
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Task>, sqlx::Error> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM ai_tasks WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Task::try_from).transpose()
}

/// Find tasks of a project, newest first
pub async fn find_by_project(pool: &PgPool, project_id: i64) -> Result<Vec<Task>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM ai_tasks WHERE project_id = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Task::try_from).collect()
}

/// Find tasks submitted by a user, newest first
pub async fn find_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Task>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM ai_tasks WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Task::try_from).collect()
}

/// Find up to `limit` pending tasks, oldest first
pub async fn find_runnable(pool: &PgPool, limit: i64) -> Result<Vec<Task>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        r#"
        SELECT {TASK_COLUMNS}
        FROM ai_tasks
        WHERE status = $1
        ORDER BY created_at ASC, id ASC
        LIMIT $2
        "#
    ))
    .bind(TaskStatus::Pending.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Task::try_from).collect()
}

/// Move a task from pending to running if it is still pending
///
/// Returns the number of rows affected (0 or 1). Postgres evaluates the
/// status check and the update atomically for the row.
pub async fn claim(pool: &PgPool, task_id: i64, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE ai_tasks
        SET status = $1, started_at = $2
        WHERE id = $3 AND status = $4
        "#,
    )
    .bind(TaskStatus::Running.as_str())
    .bind(now)
    .bind(task_id)
    .bind(TaskStatus::Pending.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Mark a running task as succeeded
pub async fn finalize_success(
    pool: &PgPool,
    task_id: i64,
    result_data: &str,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE ai_tasks
        SET status = $1, result_data = $2, completed_at = $3
        WHERE id = $4 AND status = $5
        "#,
    )
    .bind(TaskStatus::Success.as_str())
    .bind(result_data)
    .bind(now)
    .bind(task_id)
    .bind(TaskStatus::Running.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Mark a running task as failed
pub async fn finalize_failure(
    pool: &PgPool,
    task_id: i64,
    error_message: &str,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE ai_tasks
        SET status = $1, error_message = $2, completed_at = $3
        WHERE id = $4 AND status = $5
        "#,
    )
    .bind(TaskStatus::Failed.as_str())
    .bind(error_message)
    .bind(now)
    .bind(task_id)
    .bind(TaskStatus::Running.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Fail running tasks that started before `started_before`
/// Returns the number of tasks failed
pub async fn fail_stale(
    pool: &PgPool,
    started_before: DateTime<Utc>,
    error_message: &str,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE ai_tasks
        SET status = $1, error_message = $2, completed_at = $3
        WHERE status = $4 AND started_at < $5
        "#,
    )
    .bind(TaskStatus::Failed.as_str())
    .bind(error_message)
    .bind(now)
    .bind(TaskStatus::Running.as_str())
    .bind(started_before)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    project_id: i64,
    user_id: i64,
    task_type: String,
    status: String,
    input_data: String,
    result_data: Option<String>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRow> for Task {
    type Error = sqlx::Error;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<TaskStatus>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Task {
            id: row.id,
            project_id: row.project_id,
            user_id: row.user_id,
            task_type: TaskType::from(row.task_type),
            status,
            input_data: row.input_data,
            result_data: row.result_data,
            error_message: row.error_message,
            created_at: row.created_at,
            started_at: row.started_at,
            completed_at: row.completed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, task_type: &str) -> TaskRow {
        TaskRow {
            id: 1,
            project_id: 2,
            user_id: 3,
            task_type: task_type.to_string(),
            status: status.to_string(),
            input_data: "{}".to_string(),
            result_data: None,
            error_message: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_row_conversion() {
        let task = Task::try_from(row("running", "LOG_SUMMARY")).unwrap();
        assert_eq!(task.status, TaskStatus::Running);
        assert_eq!(task.task_type, TaskType::LogSummary);

        let task = Task::try_from(row("pending", "SECURITY_AUDIT")).unwrap();
        assert_eq!(
            task.task_type,
            TaskType::Unknown("SECURITY_AUDIT".to_string())
        );
    }

    #[test]
    fn test_row_with_unknown_status_is_rejected() {
        let err = Task::try_from(row("Queued", "LOG_SUMMARY")).unwrap_err();
        assert!(matches!(err, sqlx::Error::Decode(_)));
    }
}
