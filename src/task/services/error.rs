//! Errors surfaced by the task lifecycle service.

use crate::{
    error::ErrorKind,
    task::{
        domain::{TaskDomainError, TaskId, TransitionDenied},
        ports::TaskRepositoryError,
    },
    user::{domain::UserId, ports::UserRepositoryError},
};
use std::fmt;
use thiserror::Error;

/// Task operations restricted to privileged roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOperation {
    /// Creating a task.
    Create,
    /// Editing task details.
    Update,
    /// Replacing the dependents of a task.
    SetDependents,
}

impl TaskOperation {
    /// Returns a short name for log and error output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::SetDependents => "set_dependents",
        }
    }
}

impl fmt::Display for TaskOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization refusals outside the status transition path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessDenied {
    /// The operation requires an admin or manager.
    #[error("user {actor} may not {operation} tasks")]
    PrivilegeRequired {
        /// The acting user.
        actor: UserId,
        /// The refused operation.
        operation: TaskOperation,
    },

    /// The authorization collaborator refused the update.
    #[error("user {actor} may not update task {task}")]
    UpdateNotPermitted {
        /// The acting user.
        actor: UserId,
        /// The task.
        task: TaskId,
    },
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// The task does not exist or lies outside the actor's visibility.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A referenced user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The actor lacks the required capability.
    #[error(transparent)]
    Access(#[from] AccessDenied),

    /// The status transition was refused.
    #[error(transparent)]
    Transition(#[from] TransitionDenied),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Task repository operation failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),

    /// User repository operation failed.
    #[error(transparent)]
    UserRepository(UserRepositoryError),
}

impl TaskLifecycleError {
    /// Returns the stable classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::TaskNotFound(_) | Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::Access(_) | Self::Transition(TransitionDenied::NotPermitted { .. }) => {
                ErrorKind::PermissionDenied
            }
            Self::Transition(TransitionDenied::UnresolvedDependents { .. }) => {
                ErrorKind::InvalidOperation
            }
            Self::Domain(TaskDomainError::StaleTransition(_))
            | Self::Repository(_)
            | Self::UserRepository(_) => ErrorKind::Internal,
            Self::Domain(_) => ErrorKind::InvalidOperation,
        }
    }
}

impl From<TaskRepositoryError> for TaskLifecycleError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(id) => Self::TaskNotFound(id),
            other => Self::Repository(other),
        }
    }
}

impl From<UserRepositoryError> for TaskLifecycleError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::NotFound(id) => Self::UserNotFound(id),
            other => Self::UserRepository(other),
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;
