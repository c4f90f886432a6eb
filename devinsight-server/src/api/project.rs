//! Project API Handlers
//!
//! HTTP endpoints for projects and membership.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use devinsight_core::domain::project::ProjectMember;
use devinsight_core::dto::project::{AddMember, ProjectRequest, ProjectView};
use sqlx::PgPool;

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::service::project_service;

/// POST /api/projects
/// Create a new project owned by the caller
pub async fn create_project(
    State(pool): State<PgPool>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<ProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectView>)> {
    tracing::info!("User {} creating project: {}", user_id, req.name);

    let project = project_service::create_project(&pool, user_id, req).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects
/// List the caller's projects
pub async fn list_projects(
    State(pool): State<PgPool>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Json<Vec<ProjectView>>> {
    tracing::debug!("Listing projects for user: {}", user_id);

    let projects = project_service::list_user_projects(&pool, user_id).await?;
    Ok(Json(projects))
}

/// GET /api/projects/{id}
/// Get a project the caller belongs to
pub async fn get_project(
    State(pool): State<PgPool>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProjectView>> {
    tracing::debug!("Getting project: {}", id);

    let project = project_service::get_project(&pool, user_id, id).await?;
    Ok(Json(project))
}

/// PUT /api/projects/{id}
/// Update a project's name and description
pub async fn update_project(
    State(pool): State<PgPool>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<ProjectRequest>,
) -> ApiResult<Json<ProjectView>> {
    tracing::info!("User {} updating project {}", user_id, id);

    let project = project_service::update_project(&pool, user_id, id, req).await?;
    Ok(Json(project))
}

/// DELETE /api/projects/{id}
/// Delete a project with its members and tasks
pub async fn delete_project(
    State(pool): State<PgPool>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    tracing::info!("User {} deleting project {}", user_id, id);

    project_service::delete_project(&pool, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/projects/{id}/members
/// Add a member to a project
pub async fn add_member(
    State(pool): State<PgPool>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<AddMember>,
) -> ApiResult<(StatusCode, Json<ProjectMember>)> {
    tracing::info!("User {} adding user {} to project {}", user_id, req.user_id, id);

    let member = project_service::add_member(&pool, user_id, id, req).await?;
    Ok((StatusCode::CREATED, Json(member)))
}
