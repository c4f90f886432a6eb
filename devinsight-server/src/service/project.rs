//! Project Service
//!
//! Minimal project bookkeeping: creating, editing and deleting projects and
//! managing membership, which gates task submission and queries.

use devinsight_core::domain::project::{MemberRole, ProjectMember};
use devinsight_core::dto::project::{AddMember, ProjectRequest, ProjectView};
use sqlx::PgPool;

use crate::repository::project_repository;

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Project {0} not found")]
    NotFound(i64),
    #[error("{0}")]
    Forbidden(String),
    #[error("User {0} is already a member")]
    AlreadyMember(i64),
    #[error("{0}")]
    ValidationError(String),
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, ProjectError>;

/// Create a project owned by the calling user
pub async fn create_project(
    pool: &PgPool,
    owner_id: i64,
    req: ProjectRequest,
) -> Result<ProjectView> {
    validate_project_request(&req)?;

    let project = project_repository::create(pool, req, owner_id).await?;

    tracing::info!("Project created: {} ({}) by user {}", project.name, project.id, owner_id);

    Ok(ProjectView::new(project, MemberRole::Owner))
}

/// List the projects the user belongs to
pub async fn list_user_projects(pool: &PgPool, user_id: i64) -> Result<Vec<ProjectView>> {
    let projects = project_repository::find_by_member(pool, user_id).await?;

    Ok(projects
        .into_iter()
        .map(|(project, role)| ProjectView::new(project, role))
        .collect())
}

/// Get a project the user belongs to
pub async fn get_project(pool: &PgPool, user_id: i64, id: i64) -> Result<ProjectView> {
    let project = project_repository::find_by_id(pool, id)
        .await?
        .ok_or(ProjectError::NotFound(id))?;

    let member = project_repository::find_member(pool, id, user_id)
        .await?
        .ok_or_else(|| {
            ProjectError::Forbidden("You do not have access to this project".to_string())
        })?;

    Ok(ProjectView::new(project, member.role))
}

/// Update a project's name and description; owners only
pub async fn update_project(
    pool: &PgPool,
    user_id: i64,
    id: i64,
    req: ProjectRequest,
) -> Result<ProjectView> {
    validate_project_request(&req)?;
    ensure_owner(pool, id, user_id).await?;

    let project = project_repository::update(pool, id, req)
        .await?
        .ok_or(ProjectError::NotFound(id))?;

    tracing::info!("Project {} updated by user {}", id, user_id);

    Ok(ProjectView::new(project, MemberRole::Owner))
}

/// Delete a project together with its members and tasks; owners only
pub async fn delete_project(pool: &PgPool, user_id: i64, id: i64) -> Result<()> {
    ensure_owner(pool, id, user_id).await?;

    if project_repository::delete(pool, id).await? == 0 {
        return Err(ProjectError::NotFound(id));
    }

    tracing::info!("Project {} deleted by user {}", id, user_id);

    Ok(())
}

/// Add a member to a project; owners only
pub async fn add_member(
    pool: &PgPool,
    caller_id: i64,
    project_id: i64,
    req: AddMember,
) -> Result<ProjectMember> {
    project_repository::find_by_id(pool, project_id)
        .await?
        .ok_or(ProjectError::NotFound(project_id))?;

    ensure_owner(pool, project_id, caller_id).await?;

    let role = req.role.unwrap_or(MemberRole::Member);
    let member = project_repository::add_member(pool, project_id, req.user_id, role)
        .await?
        .ok_or(ProjectError::AlreadyMember(req.user_id))?;

    tracing::info!(
        "User {} added to project {} as {}",
        member.user_id,
        project_id,
        member.role
    );

    Ok(member)
}

async fn ensure_owner(pool: &PgPool, project_id: i64, user_id: i64) -> Result<()> {
    let member = project_repository::find_member(pool, project_id, user_id).await?;
    require_owner(member.as_ref())
}

/// Ownership is a membership with the `OWNER` role, not the creator field
fn require_owner(member: Option<&ProjectMember>) -> Result<()> {
    match member {
        Some(member) if member.role == MemberRole::Owner => Ok(()),
        _ => Err(ProjectError::Forbidden(
            "Only a project owner can do this".to_string(),
        )),
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_project_request(req: &ProjectRequest) -> Result<()> {
    if req.name.trim().is_empty() {
        return Err(ProjectError::ValidationError(
            "Project name cannot be empty".to_string(),
        ));
    }

    if req.name.chars().count() > MAX_NAME_LEN {
        return Err(ProjectError::ValidationError(format!(
            "Project name is too long (max {} characters)",
            MAX_NAME_LEN
        )));
    }

    if let Some(description) = &req.description {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ProjectError::ValidationError(format!(
                "Project description is too long (max {} characters)",
                MAX_DESCRIPTION_LEN
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(role: MemberRole) -> ProjectMember {
        ProjectMember {
            project_id: 1,
            user_id: 5,
            role,
            joined_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_validate_project_request_valid() {
        let req = ProjectRequest {
            name: "Checkout service".to_string(),
            description: None,
        };
        assert!(validate_project_request(&req).is_ok());

        let req = ProjectRequest {
            name: "Checkout service".to_string(),
            description: Some("d".repeat(MAX_DESCRIPTION_LEN)),
        };
        assert!(validate_project_request(&req).is_ok());
    }

    #[test]
    fn test_validate_project_request_invalid() {
        let empty = ProjectRequest {
            name: "   ".to_string(),
            description: None,
        };
        assert!(matches!(
            validate_project_request(&empty),
            Err(ProjectError::ValidationError(_))
        ));

        let long = ProjectRequest {
            name: "p".repeat(101),
            description: Some("too long".to_string()),
        };
        assert!(matches!(
            validate_project_request(&long),
            Err(ProjectError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_project_request_description_too_long() {
        let req = ProjectRequest {
            name: "Checkout service".to_string(),
            description: Some("é".repeat(MAX_DESCRIPTION_LEN + 1)),
        };
        assert!(matches!(
            validate_project_request(&req),
            Err(ProjectError::ValidationError(_))
        ));
    }

    #[test]
    fn test_owner_rights_follow_role() {
        // Any OWNER member counts, not only the creator
        assert!(require_owner(Some(&member(MemberRole::Owner))).is_ok());

        assert!(matches!(
            require_owner(Some(&member(MemberRole::Member))),
            Err(ProjectError::Forbidden(_))
        ));
        assert!(matches!(require_owner(None), Err(ProjectError::Forbidden(_))));
    }
}
