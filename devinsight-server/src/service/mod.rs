//! Service Module
//!
//! Business logic layer for the server.
//! Services orchestrate between repositories and enforce membership rules.

pub mod project;
pub mod task;

// Re-export for convenience
pub use project as project_service;
pub use task as task_service;
