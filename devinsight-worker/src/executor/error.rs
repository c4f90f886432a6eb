//! Executor error type

use std::time::Duration;
use thiserror::Error;

/// Why a task's processing step did not produce a result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// No executor is registered for the task's type tag
    #[error("unknown task type: {0}")]
    UnknownTaskType(String),

    /// The input payload cannot be processed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The executor reported a failure
    #[error("{0}")]
    Failed(String),

    /// The executor panicked
    #[error("executor panicked: {0}")]
    Panicked(String),

    /// The executor exceeded the configured deadline
    #[error("execution timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

impl ExecutionError {
    /// Stable name of the failure category
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionError::UnknownTaskType(_) => "UnknownTaskType",
            ExecutionError::InvalidInput(_) => "InvalidInput",
            ExecutionError::Failed(_) => "ExecutionFailed",
            ExecutionError::Panicked(_) => "ExecutorPanicked",
            ExecutionError::TimedOut(_) => "TimedOut",
        }
    }

    /// Message recorded on the failed task; never empty.
    pub fn failure_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            self.kind().to_string()
        } else {
            message
        }
    }
}
