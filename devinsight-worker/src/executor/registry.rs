//! Executor registry

use devinsight_core::domain::task::TaskType;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::{ExceptionAnalysisExecutor, ExecutionError, LogSummaryExecutor, TaskExecutor};

/// Maps task type tags to the executor that handles them
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: HashMap<TaskType, Arc<dyn TaskExecutor>>,
}

impl ExecutorRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in analysis executors
    pub fn with_defaults(simulated_latency: Duration) -> Self {
        let mut registry = Self::new();
        registry.register(
            TaskType::ExceptionAnalysis,
            ExceptionAnalysisExecutor::new(simulated_latency),
        );
        registry.register(
            TaskType::LogSummary,
            LogSummaryExecutor::new(simulated_latency),
        );
        registry
    }

    /// Registers an executor for a task type, replacing any previous one
    pub fn register<E>(&mut self, task_type: TaskType, executor: E) -> &mut Self
    where
        E: TaskExecutor + 'static,
    {
        self.executors.insert(task_type, Arc::new(executor));
        self
    }

    /// Looks up the executor for a task type
    pub fn resolve(&self, task_type: &TaskType) -> Result<Arc<dyn TaskExecutor>, ExecutionError> {
        self.executors
            .get(task_type)
            .cloned()
            .ok_or_else(|| ExecutionError::UnknownTaskType(task_type.as_str().to_string()))
    }

    /// Task types with a registered executor
    pub fn task_types(&self) -> Vec<&TaskType> {
        let mut types: Vec<&TaskType> = self.executors.keys().collect();
        types.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        types
    }
}
