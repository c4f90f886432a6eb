//! Task domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Asynchronous analysis task record
///
/// Structure shared between the server (persists, queries) and the worker
/// (claims, executes, finalizes).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub input_data: String,
    pub result_data: Option<String>,
    pub error_message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Task execution status
///
/// Persisted verbatim as the lowercase string returned by [`TaskStatus::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Success,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Success => "success",
            TaskStatus::Failed => "failed",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Running => "Running",
            TaskStatus::Success => "Succeeded",
            TaskStatus::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failed)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// `pending -> running -> success | failed`; terminal states never move.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Running, TaskStatus::Success)
                | (TaskStatus::Running, TaskStatus::Failed)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a persisted status string is outside the known set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid task status: {0}")]
pub struct InvalidTaskStatus(pub String);

impl FromStr for TaskStatus {
    type Err = InvalidTaskStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "running" => Ok(TaskStatus::Running),
            "success" => Ok(TaskStatus::Success),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(InvalidTaskStatus(other.to_string())),
        }
    }
}

/// Task type tag, used as the executor dispatch key
///
/// Tags this build does not know about are kept as [`TaskType::Unknown`] so
/// that such rows still load; the scheduler fails them at execution time.
///
/// Equality and hashing go through the tag, so `Unknown("LOG_SUMMARY")` and
/// `LogSummary` are the same type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskType {
    ExceptionAnalysis,
    LogSummary,
    Unknown(String),
}

impl TaskType {
    pub fn as_str(&self) -> &str {
        match self {
            TaskType::ExceptionAnalysis => "EXCEPTION_ANALYSIS",
            TaskType::LogSummary => "LOG_SUMMARY",
            TaskType::Unknown(tag) => tag,
        }
    }

    /// Human-readable label; unknown tags are shown as-is
    pub fn label(&self) -> &str {
        match self {
            TaskType::ExceptionAnalysis => "Exception analysis",
            TaskType::LogSummary => "Log summary",
            TaskType::Unknown(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TaskType::Unknown(_))
    }
}

impl PartialEq for TaskType {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for TaskType {}

impl Hash for TaskType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<&str> for TaskType {
    fn from(tag: &str) -> Self {
        match tag {
            "EXCEPTION_ANALYSIS" => TaskType::ExceptionAnalysis,
            "LOG_SUMMARY" => TaskType::LogSummary,
            other => TaskType::Unknown(other.to_string()),
        }
    }
}

impl From<String> for TaskType {
    fn from(tag: String) -> Self {
        TaskType::from(tag.as_str())
    }
}

impl From<TaskType> for String {
    fn from(task_type: TaskType) -> Self {
        task_type.as_str().to_string()
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions_follow_state_machine() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Running));
        assert!(TaskStatus::Running.can_transition_to(TaskStatus::Success));
        assert!(TaskStatus::Running.can_transition_to(TaskStatus::Failed));

        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Success));
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Failed));
        assert!(!TaskStatus::Running.can_transition_to(TaskStatus::Pending));
        for terminal in [TaskStatus::Success, TaskStatus::Failed] {
            assert!(terminal.is_terminal());
            for next in [
                TaskStatus::Pending,
                TaskStatus::Running,
                TaskStatus::Success,
                TaskStatus::Failed,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_status_string_form() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::Running,
            TaskStatus::Success,
            TaskStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
        }
        assert!("Queued".parse::<TaskStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&TaskStatus::Running).unwrap(),
            "\"running\""
        );
    }

    #[test]
    fn test_task_type_unknown_tag_is_preserved() {
        let task_type = TaskType::from("SECURITY_AUDIT");
        assert!(!task_type.is_known());
        assert_eq!(task_type.as_str(), "SECURITY_AUDIT");
        assert_eq!(task_type.label(), "SECURITY_AUDIT");

        let json = serde_json::to_string(&task_type).unwrap();
        assert_eq!(json, "\"SECURITY_AUDIT\"");
    }

    #[test]
    fn test_task_type_known_tags() {
        assert_eq!(TaskType::from("LOG_SUMMARY"), TaskType::LogSummary);
        assert_eq!(
            serde_json::from_str::<TaskType>("\"EXCEPTION_ANALYSIS\"").unwrap(),
            TaskType::ExceptionAnalysis
        );
        assert_eq!(TaskType::LogSummary.label(), "Log summary");
    }

    #[test]
    fn test_task_type_equality_follows_tag() {
        use std::collections::HashSet;

        let spelled_out = TaskType::Unknown("LOG_SUMMARY".to_string());
        assert_eq!(spelled_out, TaskType::LogSummary);
        assert_ne!(spelled_out, TaskType::ExceptionAnalysis);

        let set: HashSet<TaskType> = [TaskType::LogSummary, spelled_out].into_iter().collect();
        assert_eq!(set.len(), 1);
    }
}
