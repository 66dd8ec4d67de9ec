//! Taskward: task visibility, dependency, and status-transition engine.
//!
//! This crate decides, for an authenticated actor and a task, which tasks
//! are visible, whether a set of dependency links may be applied, and
//! whether a requested status change is permitted given the task's
//! dependency graph and the actor's role.
//!
//! # Architecture
//!
//! Taskward follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, policy, etc.)
//!
//! # Modules
//!
//! - [`user`]: Roles, accounts, and validated role reassignment
//! - [`task`]: Tasks, dependency graph, visibility, and status transitions
//! - [`error`]: Stable error kinds shared by all services

pub mod error;
pub mod task;
pub mod user;

pub use error::ErrorKind;
