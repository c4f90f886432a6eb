//! API Module
//!
//! HTTP API layer for the server.
//! Each submodule handles endpoints for a specific domain.

pub mod auth;
pub mod error;
pub mod health;
pub mod project;
pub mod task;
pub mod user;

use axum::{
    Router,
    routing::{get, post},
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

/// Create the main API router with all endpoints
pub fn create_router(pool: PgPool) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Project endpoints
        .route(
            "/api/projects",
            get(project::list_projects).post(project::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(project::get_project)
                .put(project::update_project)
                .delete(project::delete_project),
        )
        .route("/api/projects/{id}/members", post(project::add_member))
        // User endpoints
        .route("/api/users/me", get(user::current_user))
        // Task endpoints
        .route("/api/tasks", post(task::submit_task))
        .route("/api/tasks/my", get(task::list_my_tasks))
        .route("/api/tasks/{id}", get(task::get_task))
        .route(
            "/api/tasks/project/{project_id}",
            get(task::list_project_tasks),
        )
        // Add state and middleware
        .with_state(pool)
        .layer(TraceLayer::new_for_http())
}
