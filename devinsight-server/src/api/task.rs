//! Task API Handlers
//!
//! HTTP endpoints for submitting and inspecting analysis tasks.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use devinsight_core::dto::task::{SubmitTask, TaskSubmitted, TaskView};
use sqlx::PgPool;

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::service::task_service;

/// POST /api/tasks
/// Submit a new task for asynchronous processing
pub async fn submit_task(
    State(pool): State<PgPool>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<SubmitTask>,
) -> ApiResult<(StatusCode, Json<TaskSubmitted>)> {
    tracing::info!(
        "User {} submitting {} task for project {}",
        user_id,
        req.task_type,
        req.project_id
    );

    let task = task_service::submit_task(&pool, user_id, req).await?;

    Ok((StatusCode::CREATED, Json(TaskSubmitted { task_id: task.id })))
}

/// GET /api/tasks/{id}
/// Get task details by ID
pub async fn get_task(
    State(pool): State<PgPool>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<TaskView>> {
    tracing::debug!("Getting task: {}", id);

    let task = task_service::get_task(&pool, user_id, id).await?;
    Ok(Json(task))
}

/// GET /api/tasks/project/{project_id}
/// List the tasks of a project
pub async fn list_project_tasks(
    State(pool): State<PgPool>,
    CurrentUser(user_id): CurrentUser,
    Path(project_id): Path<i64>,
) -> ApiResult<Json<Vec<TaskView>>> {
    tracing::debug!("Listing tasks for project: {}", project_id);

    let tasks = task_service::list_project_tasks(&pool, user_id, project_id).await?;
    Ok(Json(tasks))
}

/// GET /api/tasks/my
/// List the caller's own tasks
pub async fn list_my_tasks(
    State(pool): State<PgPool>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Json<Vec<TaskView>>> {
    tracing::debug!("Listing tasks for user: {}", user_id);

    let tasks = task_service::list_user_tasks(&pool, user_id).await?;
    Ok(Json(tasks))
}
