//! Project and membership domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Project owning a set of tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Membership of a user in a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMember {
    pub project_id: i64,
    pub user_id: i64,
    pub role: MemberRole,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

/// Role of a project member
///
/// Owners may edit, delete and add members to a project; any member may
/// submit and read its tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberRole {
    Owner,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "OWNER",
            MemberRole::Member => "MEMBER",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a persisted role string is outside the known set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid member role: {0}")]
pub struct InvalidMemberRole(pub String);

impl FromStr for MemberRole {
    type Err = InvalidMemberRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OWNER" => Ok(MemberRole::Owner),
            "MEMBER" => Ok(MemberRole::Member),
            other => Err(InvalidMemberRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_role_string_form() {
        for role in [MemberRole::Owner, MemberRole::Member] {
            assert_eq!(role.as_str().parse::<MemberRole>(), Ok(role));
        }
        assert_eq!(
            "ADMIN".parse::<MemberRole>(),
            Err(InvalidMemberRole("ADMIN".to_string()))
        );
        assert!("owner".parse::<MemberRole>().is_err());
    }
}
