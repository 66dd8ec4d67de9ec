//! Status transition command and its validation outcomes.

use super::{TaskId, TaskStatus};
use crate::user::domain::UserId;
use thiserror::Error;

/// Request to move a task to `target` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusTransitionRequest {
    task: TaskId,
    target: TaskStatus,
}

impl StatusTransitionRequest {
    /// Creates a status transition request.
    #[must_use]
    pub const fn new(task: TaskId, target: TaskStatus) -> Self {
        Self { task, target }
    }

    /// Returns the task to transition.
    #[must_use]
    pub const fn task(&self) -> TaskId {
        self.task
    }

    /// Returns the requested status.
    #[must_use]
    pub const fn target(&self) -> TaskStatus {
        self.target
    }
}

/// A permitted status transition.
///
/// Only the status transition guard constructs decisions, so holding one
/// proves every check passed for the task's status at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionDecision {
    task: TaskId,
    from: TaskStatus,
    to: TaskStatus,
}

impl TransitionDecision {
    pub(crate) const fn new(task: TaskId, from: TaskStatus, to: TaskStatus) -> Self {
        Self { task, from, to }
    }

    /// Returns the task the decision applies to.
    #[must_use]
    pub const fn task(&self) -> TaskId {
        self.task
    }

    /// Returns the status at evaluation time.
    #[must_use]
    pub const fn from(&self) -> TaskStatus {
        self.from
    }

    /// Returns the permitted new status.
    #[must_use]
    pub const fn to(&self) -> TaskStatus {
        self.to
    }

    /// Returns `true` when the requested status equals the current one.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Reasons a status transition is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionDenied {
    /// The authorization collaborator refused the update capability.
    #[error("user {actor} may not set task {task} to {requested}")]
    NotPermitted {
        /// The acting user.
        actor: UserId,
        /// The task.
        task: TaskId,
        /// The requested status.
        requested: TaskStatus,
    },

    /// A plain user tried to move a task whose dependents are still open.
    #[error("task {task} has {unresolved} unresolved dependent task(s)")]
    UnresolvedDependents {
        /// The task.
        task: TaskId,
        /// Number of direct dependents still pending or in progress.
        unresolved: usize,
    },
}
