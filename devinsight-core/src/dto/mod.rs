//! Data Transfer Objects
//!
//! Request and response shapes exchanged with API clients.

pub mod project;
pub mod task;
