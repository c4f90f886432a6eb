//! Scheduler layer for the worker
//!
//! This layer drives tasks from `pending` to a terminal state. It polls the
//! task store on a fixed delay, claims tasks with the store's conditional
//! update and hands them to the executor registry.

pub mod poller;


pub use poller::TaskScheduler;

/// Counters describing one scheduler tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Pending tasks returned by the store
    pub fetched: usize,
    /// Tasks this worker claimed and finalized
    pub claimed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Tasks another worker claimed first
    pub skipped: usize,
    /// Tasks whose handling hit an unexpected fault
    pub errored: usize,
    /// Running tasks failed by the stale sweep
    pub swept: u64,
}
