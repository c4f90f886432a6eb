//! Project Repository
//!
//! Handles database operations for projects and their members.

use chrono::{DateTime, Utc};
use devinsight_core::domain::project::{MemberRole, Project, ProjectMember};
use devinsight_core::dto::project::ProjectRequest;
use sqlx::PgPool;

const PROJECT_COLUMNS: &str = "id, name, description, owner_id, created_at, updated_at";

/// Create a project and register its owner as a member
pub async fn create(
    pool: &PgPool,
    req: ProjectRequest,
    owner_id: i64,
) -> Result<Project, sqlx::Error> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        r#"
        INSERT INTO projects (name, description, owner_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $4)
        RETURNING {PROJECT_COLUMNS}
        "#
    ))
    .bind(&req.name)
    .bind(&req.description)
    .bind(owner_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO project_members (project_id, user_id, role, joined_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(row.id)
    .bind(owner_id)
    .bind(MemberRole::Owner.as_str())
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(row.into())
}

/// Find a project by ID
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Project>, sqlx::Error> {
    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Find every project a user belongs to, with the user's role, newest first
pub async fn find_by_member(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<(Project, MemberRole)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MembershipRow>(
        r#"
        SELECT p.id, p.name, p.description, p.owner_id, p.created_at, p.updated_at,
               m.role
        FROM projects p
        JOIN project_members m ON m.project_id = p.id
        WHERE m.user_id = $1
        ORDER BY p.created_at DESC, p.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(MembershipRow::into_parts).collect()
}

/// Update a project's name and description
/// Returns `None` if the project does not exist
pub async fn update(
    pool: &PgPool,
    id: i64,
    req: ProjectRequest,
) -> Result<Option<Project>, sqlx::Error> {
    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        r#"
        UPDATE projects
        SET name = $1, description = $2, updated_at = $3
        WHERE id = $4
        RETURNING {PROJECT_COLUMNS}
        "#
    ))
    .bind(&req.name)
    .bind(&req.description)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Delete a project; members and tasks go with it (`ON DELETE CASCADE`)
/// Returns the number of projects deleted
pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Find a user's membership in a project
pub async fn find_member(
    pool: &PgPool,
    project_id: i64,
    user_id: i64,
) -> Result<Option<ProjectMember>, sqlx::Error> {
    let row = sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT project_id, user_id, role, joined_at
        FROM project_members
        WHERE project_id = $1 AND user_id = $2
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(ProjectMember::try_from).transpose()
}

/// Add a member to a project
/// Returns `None` if the user already is a member
pub async fn add_member(
    pool: &PgPool,
    project_id: i64,
    user_id: i64,
    role: MemberRole,
) -> Result<Option<ProjectMember>, sqlx::Error> {
    let row = sqlx::query_as::<_, MemberRow>(
        r#"
        INSERT INTO project_members (project_id, user_id, role, joined_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (project_id, user_id) DO NOTHING
        RETURNING project_id, user_id, role, joined_at
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .bind(role.as_str())
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    row.map(ProjectMember::try_from).transpose()
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: i64,
    name: String,
    description: Option<String>,
    owner_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            name: row.name,
            description: row.description,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MembershipRow {
    #[sqlx(flatten)]
    project: ProjectRow,
    role: String,
}

impl MembershipRow {
    fn into_parts(self) -> Result<(Project, MemberRole), sqlx::Error> {
        let role = parse_role(&self.role)?;
        Ok((self.project.into(), role))
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    project_id: i64,
    user_id: i64,
    role: String,
    joined_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for ProjectMember {
    type Error = sqlx::Error;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(ProjectMember {
            project_id: row.project_id,
            user_id: row.user_id,
            role: parse_role(&row.role)?,
            joined_at: row.joined_at,
        })
    }
}

fn parse_role(raw: &str) -> Result<MemberRole, sqlx::Error> {
    raw.parse::<MemberRole>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member_row(role: &str) -> MemberRow {
        MemberRow {
            project_id: 1,
            user_id: 2,
            role: role.to_string(),
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn test_member_row_conversion() {
        let member = ProjectMember::try_from(member_row("OWNER")).unwrap();
        assert_eq!(member.role, MemberRole::Owner);
        assert_eq!(member.user_id, 2);
    }

    #[test]
    fn test_member_row_with_unknown_role_is_rejected() {
        let err = ProjectMember::try_from(member_row("ADMIN")).unwrap_err();
        assert!(matches!(err, sqlx::Error::Decode(_)));
    }
}
