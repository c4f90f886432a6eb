//! Project DTOs

use serde::{Deserialize, Serialize};

use crate::domain::project::{MemberRole, Project};

/// Request to create or update a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request to add a member to a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMember {
    pub user_id: i64,
    #[serde(default)]
    pub role: Option<MemberRole>,
}

/// Project as returned to API clients, with the caller's role in it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub my_role: MemberRole,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ProjectView {
    pub fn new(project: Project, my_role: MemberRole) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            owner_id: project.owner_id,
            my_role,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_request_description_is_optional() {
        let req: ProjectRequest = serde_json::from_str(r#"{"name": "billing"}"#).unwrap();
        assert_eq!(req.name, "billing");
        assert!(req.description.is_none());
    }

    #[test]
    fn test_project_view_serializes_role() {
        let now = chrono::Utc::now();
        let project = Project {
            id: 4,
            name: "billing".to_string(),
            description: None,
            owner_id: 1,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(ProjectView::new(project, MemberRole::Member)).unwrap();
        assert_eq!(json["my_role"], "MEMBER");
        assert_eq!(json["id"], 4);
    }
}
