//! Task aggregate root and its detail-update parameter object.

use super::{TaskDomainError, TaskId, TaskStatus, TaskTitle, TransitionDecision};
use crate::user::domain::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Task aggregate root.
///
/// The owner is fixed at creation. Status changes only through a
/// [`TransitionDecision`]; dependency edges live with the persistence
/// collaborator rather than on the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: Option<String>,
    status: TaskStatus,
    due_date: Option<NaiveDate>,
    owner: UserId,
    assignees: BTreeSet<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Field values for a task that has not been created yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Validated title.
    pub title: TaskTitle,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Initial assignees.
    pub assignees: BTreeSet<UserId>,
}

impl NewTask {
    /// Creates the field set for a task with only a title.
    #[must_use]
    pub const fn new(title: TaskTitle) -> Self {
        Self {
            title,
            description: None,
            due_date: None,
            assignees: BTreeSet::new(),
        }
    }
}

/// Changes to the non-status fields of a task. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDetailsUpdate {
    /// Replacement title.
    pub title: Option<TaskTitle>,
    /// Replacement description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// Replacement due date; `Some(None)` clears it.
    pub due_date: Option<Option<NaiveDate>>,
    /// Replacement assignee set (set-replace, not merge).
    pub assignees: Option<BTreeSet<UserId>>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted due date.
    pub due_date: Option<NaiveDate>,
    /// Persisted owner.
    pub owner: UserId,
    /// Persisted assignee set.
    pub assignees: BTreeSet<UserId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task owned by `owner`.
    #[must_use]
    pub fn new(fields: NewTask, owner: UserId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title: fields.title,
            description: fields.description,
            status: TaskStatus::Pending,
            due_date: fields.due_date,
            owner,
            assignees: fields.assignees,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            due_date: data.due_date,
            owner: data.owner,
            assignees: data.assignees,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the persisted representation of this task.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedTaskData {
        PersistedTaskData {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            due_date: self.due_date,
            owner: self.owner,
            assignees: self.assignees.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the assignee set.
    #[must_use]
    pub const fn assignees(&self) -> &BTreeSet<UserId> {
        &self.assignees
    }

    /// Returns `true` when `user` created the task.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }

    /// Returns `true` when `user` is among the assignees.
    #[must_use]
    pub fn is_assigned_to(&self, user: UserId) -> bool {
        self.assignees.contains(&user)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies changes to the non-status fields.
    pub fn apply_details(&mut self, update: TaskDetailsUpdate, clock: &impl Clock) {
        let TaskDetailsUpdate {
            title,
            description,
            due_date,
            assignees,
        } = update;

        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_due_date) = due_date {
            self.due_date = new_due_date;
        }
        if let Some(new_assignees) = assignees {
            self.assignees = new_assignees;
        }
        self.touch(clock);
    }

    /// Applies a status transition decision.
    ///
    /// A no-op decision leaves the task, including its timestamp, untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::StaleTransition`] when the decision was
    /// made for another task or for a status the task no longer holds.
    pub fn apply_transition(
        &mut self,
        decision: &TransitionDecision,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if decision.task() != self.id || decision.from() != self.status {
            return Err(TaskDomainError::StaleTransition(self.id));
        }
        if decision.is_noop() {
            return Ok(());
        }
        self.status = decision.to();
        self.touch(clock);
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
