//! Application services for task lifecycle orchestration.

mod config;
mod error;
mod guard;
mod lifecycle;

pub use config::TaskEngineConfig;
pub use error::{AccessDenied, TaskLifecycleError, TaskLifecycleResult, TaskOperation};
pub use guard::StatusTransitionGuard;
pub use lifecycle::{CreateTaskRequest, TaskLifecycleService, UpdateTaskRequest};
