//! Executor layer
//!
//! An executor performs the actual work for one task type. The scheduler
//! never branches on task types itself: it asks the [`ExecutorRegistry`] for
//! the executor registered under a task's tag and runs it.

mod analysis;
mod error;
mod registry;

use async_trait::async_trait;

pub use analysis::{ExceptionAnalysisExecutor, LogSummaryExecutor};
pub use error::ExecutionError;
pub use registry::ExecutorRegistry;

/// Processing routine for a single task type
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Processes a task's input payload
    ///
    /// # Arguments
    /// * `input` - The task's opaque input payload
    ///
    /// # Returns
    /// The result payload stored on the task on success
    async fn execute(&self, input: &str) -> Result<String, ExecutionError>;
}
