//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::service::{project_service::ProjectError, task_service::TaskError};

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    DatabaseError(sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::DatabaseError(err)
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(_) => ApiError::NotFound(err.to_string()),
            TaskError::Forbidden(msg) => ApiError::Forbidden(msg),
            TaskError::ValidationError(msg) => ApiError::BadRequest(msg),
            TaskError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

impl From<ProjectError> for ApiError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ProjectError::AlreadyMember(_) => ApiError::Conflict(err.to_string()),
            ProjectError::Forbidden(msg) => ApiError::Forbidden(msg),
            ProjectError::ValidationError(msg) => ApiError::BadRequest(msg),
            ProjectError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases = [
            (ApiError::from(TaskError::NotFound(4)), StatusCode::NOT_FOUND),
            (
                ApiError::from(TaskError::Forbidden("no".to_string())),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::from(TaskError::ValidationError("bad".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(ProjectError::AlreadyMember(2)),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(ProjectError::NotFound(9)),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Unauthorized("who?".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
