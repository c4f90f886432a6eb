//! DevInsight Server
//!
//! HTTP backend for projects and asynchronous analysis tasks.
//!
//! Architecture:
//! - Repositories: SQL access to projects, members and tasks
//! - Services: membership checks and request validation
//! - API: axum handlers and error mapping
//! - Store: Postgres implementation of the scheduler's task store
//! - Runtime: tracing, scheduler startup and shutdown signalling

pub mod api;
pub mod config;
pub mod db;
pub mod repository;
pub mod runtime;
pub mod service;
pub mod store;
