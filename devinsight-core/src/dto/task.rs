//! Task DTOs

use serde::{Deserialize, Serialize};

use crate::domain::task::{Task, TaskStatus, TaskType};

/// Request to submit a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTask {
    pub project_id: i64,
    pub task_type: TaskType,
    pub input_data: String,
}

/// A pending task ready to be inserted by a store
#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: i64,
    pub user_id: i64,
    pub task_type: TaskType,
    pub input_data: String,
}

impl NewTask {
    pub fn from_submission(req: SubmitTask, user_id: i64) -> Self {
        Self {
            project_id: req.project_id,
            user_id,
            task_type: req.task_type,
            input_data: req.input_data,
        }
    }
}

/// Response to a successful submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSubmitted {
    pub task_id: i64,
}

/// Task as returned to API clients, with display labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskView {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub task_type: TaskType,
    pub task_type_desc: String,
    pub status: TaskStatus,
    pub status_desc: String,
    pub input_data: String,
    pub result_data: Option<String>,
    pub error_message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            project_id: task.project_id,
            user_id: task.user_id,
            task_type_desc: task.task_type.label().to_string(),
            task_type: task.task_type,
            status_desc: task.status.label().to_string(),
            status: task.status,
            input_data: task.input_data,
            result_data: task.result_data,
            error_message: task.error_message,
            created_at: task.created_at,
            started_at: task.started_at,
            completed_at: task.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_view_carries_labels() {
        let task = Task {
            id: 7,
            project_id: 1,
            user_id: 2,
            task_type: TaskType::ExceptionAnalysis,
            status: TaskStatus::Pending,
            input_data: "{}".to_string(),
            result_data: None,
            error_message: None,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
        };

        let view = TaskView::from(task);
        assert_eq!(view.task_type_desc, "Exception analysis");
        assert_eq!(view.status_desc, "Pending");
        assert_eq!(view.id, 7);
    }

    #[test]
    fn test_submit_task_accepts_unrecognized_type() {
        let req: SubmitTask = serde_json::from_str(
            r#"{"project_id": 3, "task_type": "CODE_REVIEW", "input_data": "{}"}"#,
        )
        .unwrap();
        assert_eq!(req.task_type, TaskType::Unknown("CODE_REVIEW".to_string()));

        let new_task = NewTask::from_submission(req, 9);
        assert_eq!(new_task.user_id, 9);
        assert_eq!(new_task.project_id, 3);
    }
}
