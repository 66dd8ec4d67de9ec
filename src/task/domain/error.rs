//! Error types for task domain validation and parsing.

use super::TaskId;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned while constructing or mutating task domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the storage limit.
    #[error("task title exceeds {max} characters (got {length})")]
    TitleTooLong {
        /// Character count of the rejected title.
        length: usize,
        /// Maximum accepted character count.
        max: usize,
    },

    /// A task was listed among its own dependents.
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// Replacing the dependents of a task would close a dependency cycle.
    #[error("replacing the dependents of task {0} would create a dependency cycle")]
    DependencyCycle(TaskId),

    /// A due-date filter has its lower bound after its upper bound.
    #[error("due date range starts at {from} but ends at {to}")]
    InvertedDueDateRange {
        /// Inclusive lower bound.
        from: NaiveDate,
        /// Inclusive upper bound.
        to: NaiveDate,
    },

    /// Page numbers start at one.
    #[error("page number must be at least 1")]
    InvalidPageNumber,

    /// Pages hold at least one item.
    #[error("page size must be at least 1")]
    InvalidPageSize,

    /// A transition decision was applied to a task it was not made for, or
    /// after the task's status moved on.
    #[error("stale status transition for task {0}")]
    StaleTransition(TaskId),
}

/// Error returned while parsing task statuses from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
