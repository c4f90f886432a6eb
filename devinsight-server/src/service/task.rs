//! Task Service
//!
//! Submission and queries of analysis tasks. Execution is not triggered here:
//! submitted tasks are picked up by the scheduler through the task table.

use devinsight_core::domain::task::Task;
use devinsight_core::dto::task::{NewTask, SubmitTask, TaskView};
use sqlx::PgPool;

use crate::repository::{project_repository, task_repository};

const MAX_TASK_TYPE_LEN: usize = 50;
const MAX_INPUT_BYTES: usize = 1024 * 1024;

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Task {0} not found")]
    NotFound(i64),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, TaskError>;

/// Submit a new task on behalf of a project member
pub async fn submit_task(pool: &PgPool, user_id: i64, req: SubmitTask) -> Result<Task> {
    validate_submission(&req)?;
    ensure_member(pool, req.project_id, user_id, "You do not have access to this project").await?;

    let task = task_repository::create(pool, NewTask::from_submission(req, user_id)).await?;

    tracing::info!(
        "User {} submitted task {} (type {}, project {})",
        user_id,
        task.id,
        task.task_type,
        task.project_id
    );

    Ok(task)
}

/// Get a task visible to the user
pub async fn get_task(pool: &PgPool, user_id: i64, id: i64) -> Result<TaskView> {
    let task = task_repository::find_by_id(pool, id)
        .await?
        .ok_or(TaskError::NotFound(id))?;

    ensure_member(pool, task.project_id, user_id, "You do not have access to this task").await?;

    Ok(task.into())
}

/// List the tasks of a project the user belongs to
pub async fn list_project_tasks(pool: &PgPool, user_id: i64, project_id: i64) -> Result<Vec<TaskView>> {
    ensure_member(pool, project_id, user_id, "You do not have access to this project").await?;

    let tasks = task_repository::find_by_project(pool, project_id).await?;
    Ok(tasks.into_iter().map(TaskView::from).collect())
}

/// List the tasks a user submitted
pub async fn list_user_tasks(pool: &PgPool, user_id: i64) -> Result<Vec<TaskView>> {
    let tasks = task_repository::find_by_user(pool, user_id).await?;
    Ok(tasks.into_iter().map(TaskView::from).collect())
}

async fn ensure_member(pool: &PgPool, project_id: i64, user_id: i64, message: &str) -> Result<()> {
    project_repository::find_member(pool, project_id, user_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| TaskError::Forbidden(message.to_string()))
}

// =============================================================================
// Validation
// =============================================================================

fn validate_submission(req: &SubmitTask) -> Result<()> {
    let tag = req.task_type.as_str();

    if tag.trim().is_empty() {
        return Err(TaskError::ValidationError(
            "Task type cannot be empty".to_string(),
        ));
    }

    if tag.len() > MAX_TASK_TYPE_LEN {
        return Err(TaskError::ValidationError(format!(
            "Task type is too long (max {} characters)",
            MAX_TASK_TYPE_LEN
        )));
    }

    if req.input_data.len() > MAX_INPUT_BYTES {
        return Err(TaskError::ValidationError(format!(
            "Input data is too large (max {} bytes)",
            MAX_INPUT_BYTES
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use devinsight_core::domain::task::TaskType;

    fn request(task_type: &str, input: String) -> SubmitTask {
        SubmitTask {
            project_id: 1,
            task_type: TaskType::from(task_type),
            input_data: input,
        }
    }

    #[test]
    fn test_validate_submission_valid() {
        assert!(validate_submission(&request("LOG_SUMMARY", "{}".to_string())).is_ok());
        // Unrecognized tags are accepted and fail at execution time
        assert!(validate_submission(&request("CODE_REVIEW", "{}".to_string())).is_ok());
    }

    #[test]
    fn test_validate_submission_empty_type() {
        let result = validate_submission(&request("  ", "{}".to_string()));
        assert!(matches!(result, Err(TaskError::ValidationError(_))));
    }

    #[test]
    fn test_validate_submission_type_too_long() {
        let result = validate_submission(&request(&"X".repeat(51), "{}".to_string()));
        assert!(matches!(result, Err(TaskError::ValidationError(_))));
    }

    #[test]
    fn test_validate_submission_input_too_large() {
        let result = validate_submission(&request("LOG_SUMMARY", "x".repeat(MAX_INPUT_BYTES + 1)));
        assert!(matches!(result, Err(TaskError::ValidationError(_))));
    }
}
