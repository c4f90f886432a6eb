//! Core domain types
//!
//! These types represent the fundamental business entities and are shared
//! between the server (for persistence and queries) and the worker (for
//! claiming and executing tasks).

pub mod project;
pub mod task;
