//! DevInsight Worker
//!
//! Task scheduler for the DevInsight backend.
//!
//! Architecture:
//! - Configuration: Scheduler settings from environment or defaults
//! - Executors: Pluggable processing routines, one per task type
//! - Scheduler: Fixed-delay polling loop that claims and executes tasks
//!
//! The scheduler talks to persistence only through
//! [`devinsight_core::store::TaskStore`], so several schedulers (in one
//! process or many) can share a store safely.

pub mod config;
pub mod executor;
pub mod scheduler;

pub use config::Config;
pub use executor::{ExecutionError, ExecutorRegistry, TaskExecutor};
pub use scheduler::{TaskScheduler, TickSummary};
