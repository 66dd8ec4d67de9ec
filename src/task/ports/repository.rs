//! Repository port for task persistence, queries, and dependency edges.

use crate::task::domain::{
    DependencyEdge, DependentSet, Page, PageRequest, Task, TaskId, TaskQuery, TaskStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Each mutating operation is one atomic unit of work: a concurrent reader
/// never observes a partially replaced assignee or dependent set.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task together with its assignees.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists the non-status fields of an existing task: title,
    /// description, due date, the full assignee set, and the update
    /// timestamp. The stored status is never written by this call.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update_details(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Writes a new status and update timestamp as a single-row update.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier, ignoring visibility.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns one page of tasks matching the query, ordered by creation
    /// time and then identifier.
    async fn list(&self, query: &TaskQuery, page: PageRequest) -> TaskRepositoryResult<Page<Task>>;

    /// Replaces the full dependent set of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task or any
    /// dependent does not exist; no edge changes persist in that case.
    async fn replace_dependents(&self, dependents: &DependentSet) -> TaskRepositoryResult<()>;

    /// Returns the tasks that declared `id` as a dependency.
    async fn dependents_of(&self, id: TaskId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the tasks `id` declared as dependencies.
    async fn dependencies_of(&self, id: TaskId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns every stored dependency edge.
    async fn dependency_edges(&self) -> TaskRepositoryResult<Vec<DependencyEdge>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
