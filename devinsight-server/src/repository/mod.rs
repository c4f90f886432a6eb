//! Repository Module
//!
//! Data access layer for the server.
//! Each repository handles database operations for a specific domain entity.

pub mod project;
pub mod task;

// Re-export for convenience
pub use project as project_repository;
pub use task as task_repository;
