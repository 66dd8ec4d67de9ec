//! Structured list filters and the combined visibility-plus-filter query.

use super::{Task, TaskDomainError, TaskStatus, VisibilityScope};
use crate::user::domain::UserId;
use chrono::NaiveDate;

/// Optional list filters, combined with logical AND.
///
/// Every field uses explicit absence; an absent filter matches every task.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use taskward::task::domain::{TaskFilter, TaskStatus};
///
/// let filter = TaskFilter::new()
///     .with_status(TaskStatus::Pending)
///     .with_title_containing("report")
///     .with_due_from(NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"));
/// assert_eq!(filter.status(), Some(TaskStatus::Pending));
/// assert!(filter.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    status: Option<TaskStatus>,
    title: Option<String>,
    owner: Option<UserId>,
    assignee: Option<UserId>,
    due_from: Option<NaiveDate>,
    due_to: Option<NaiveDate>,
}

impl TaskFilter {
    /// Creates a filter that matches every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps tasks with exactly this status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Keeps tasks whose title contains `needle`, ignoring case.
    ///
    /// A needle that is empty after trimming leaves the filter absent.
    #[must_use]
    pub fn with_title_containing(mut self, needle: impl Into<String>) -> Self {
        let raw = needle.into();
        let trimmed = raw.trim();
        self.title = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Keeps tasks created by `owner`.
    #[must_use]
    pub const fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Keeps tasks with `assignee` among their assignees.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Keeps tasks due on or after `from`.
    #[must_use]
    pub const fn with_due_from(mut self, from: NaiveDate) -> Self {
        self.due_from = Some(from);
        self
    }

    /// Keeps tasks due on or before `to`.
    #[must_use]
    pub const fn with_due_to(mut self, to: NaiveDate) -> Self {
        self.due_to = Some(to);
        self
    }

    /// Returns the status filter.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Returns the title needle.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the owner filter.
    #[must_use]
    pub const fn owner(&self) -> Option<UserId> {
        self.owner
    }

    /// Returns the assignee filter.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Returns the inclusive lower due-date bound.
    #[must_use]
    pub const fn due_from(&self) -> Option<NaiveDate> {
        self.due_from
    }

    /// Returns the inclusive upper due-date bound.
    #[must_use]
    pub const fn due_to(&self) -> Option<NaiveDate> {
        self.due_to
    }

    /// Rejects malformed filter combinations.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvertedDueDateRange`] when both due-date
    /// bounds are present and the lower bound is after the upper bound.
    pub fn validate(&self) -> Result<(), TaskDomainError> {
        match (self.due_from, self.due_to) {
            (Some(from), Some(to)) if from > to => {
                Err(TaskDomainError::InvertedDueDateRange { from, to })
            }
            _ => Ok(()),
        }
    }

    /// Returns `true` when `task` satisfies every present filter.
    ///
    /// A task without a due date never satisfies a due-date bound.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let status_ok = self.status.is_none_or(|status| task.status() == status);
        let title_ok = self
            .title
            .as_deref()
            .is_none_or(|needle| contains_ignoring_case(task.title().as_str(), needle));
        let owner_ok = self.owner.is_none_or(|owner| task.is_owned_by(owner));
        let assignee_ok = self
            .assignee
            .is_none_or(|assignee| task.is_assigned_to(assignee));
        let from_ok = self
            .due_from
            .is_none_or(|from| task.due_date().is_some_and(|due| due >= from));
        let to_ok = self
            .due_to
            .is_none_or(|to| task.due_date().is_some_and(|due| due <= to));

        status_ok && title_ok && owner_ok && assignee_ok && from_ok && to_ok
    }
}

fn contains_ignoring_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A list query: the actor's visibility scope plus the requested filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    scope: VisibilityScope,
    filter: TaskFilter,
}

impl TaskQuery {
    /// Creates a query.
    #[must_use]
    pub const fn new(scope: VisibilityScope, filter: TaskFilter) -> Self {
        Self { scope, filter }
    }

    /// Returns the visibility scope.
    #[must_use]
    pub const fn scope(&self) -> VisibilityScope {
        self.scope
    }

    /// Returns the filters.
    #[must_use]
    pub const fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    /// Returns `true` when `task` is visible and satisfies the filters.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.scope.admits(task) && self.filter.matches(task)
    }
}
