//! Port contracts for task management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod authorization;
pub mod repository;

pub use authorization::TaskAuthorizer;
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
