//! DevInsight Core
//!
//! Core types and abstractions for the DevInsight task backend.
//!
//! This crate contains:
//! - Domain types: Core business entities (Task, Project, etc.)
//! - DTOs: Request/response shapes for API clients
//! - Store: The [`store::TaskStore`] contract the scheduler relies on,
//!   plus an in-memory implementation

pub mod domain;
pub mod dto;
pub mod store;
