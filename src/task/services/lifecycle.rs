//! Service layer coordinating task reads, writes, dependencies, and status
//! changes on behalf of an authenticated actor.

use super::{
    config::TaskEngineConfig,
    error::{AccessDenied, TaskLifecycleError, TaskLifecycleResult, TaskOperation},
    guard::StatusTransitionGuard,
};
use crate::task::{
    domain::{
        CyclePolicy, DependentSet, NewTask, Page, StatusTransitionRequest, Task,
        TaskDetailsUpdate, TaskFilter, TaskId, TaskQuery, TaskStatus, TaskTitle,
        VisibilityScope,
    },
    ports::{TaskAuthorizer, TaskRepository},
};
use crate::user::{
    domain::{User, UserId},
    ports::UserRepository,
};
use chrono::NaiveDate;
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    assignees: Vec<UserId>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            assignees: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the initial assignees. Duplicates collapse.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assignees = assignees.into_iter().collect();
        self
    }
}

/// Request payload for editing task details.
///
/// A status carried by the request is discarded; status only moves through
/// [`TaskLifecycleService::change_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    task: TaskId,
    title: Option<String>,
    description: Option<Option<String>>,
    due_date: Option<Option<NaiveDate>>,
    assignees: Option<Vec<UserId>>,
    status: Option<TaskStatus>,
}

impl UpdateTaskRequest {
    /// Creates an update for `task` that changes nothing.
    #[must_use]
    pub const fn new(task: TaskId) -> Self {
        Self {
            task,
            title: None,
            description: None,
            due_date: None,
            assignees: None,
            status: None,
        }
    }

    /// Returns the task to update.
    #[must_use]
    pub const fn task(&self) -> TaskId {
        self.task
    }

    /// Sets a new title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Clears the description.
    #[must_use]
    pub fn without_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    /// Sets a new due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(Some(due_date));
        self
    }

    /// Clears the due date.
    #[must_use]
    pub const fn without_due_date(mut self) -> Self {
        self.due_date = Some(None);
        self
    }

    /// Replaces the full assignee set.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assignees = Some(assignees.into_iter().collect());
        self
    }

    /// Carries a status, as generic edit forms do. It is never applied.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Task lifecycle orchestration service.
///
/// Holds no mutable state of its own; every decision is made from the
/// actor and the repositories at call time.
pub struct TaskLifecycleService<R, U, A, C>
where
    R: TaskRepository,
    U: UserRepository,
    A: TaskAuthorizer,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    users: Arc<U>,
    authorizer: Arc<A>,
    guard: StatusTransitionGuard<A>,
    clock: Arc<C>,
    config: TaskEngineConfig,
}

impl<R, U, A, C> Clone for TaskLifecycleService<R, U, A, C>
where
    R: TaskRepository,
    U: UserRepository,
    A: TaskAuthorizer,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            users: Arc::clone(&self.users),
            authorizer: Arc::clone(&self.authorizer),
            guard: self.guard.clone(),
            clock: Arc::clone(&self.clock),
            config: self.config,
        }
    }
}

impl<R, U, A, C> TaskLifecycleService<R, U, A, C>
where
    R: TaskRepository,
    U: UserRepository,
    A: TaskAuthorizer,
    C: Clock + Send + Sync,
{
    /// Creates a service with the default configuration.
    #[must_use]
    pub fn new(tasks: Arc<R>, users: Arc<U>, authorizer: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            users,
            guard: StatusTransitionGuard::new(Arc::clone(&authorizer)),
            authorizer,
            clock,
            config: TaskEngineConfig::default(),
        }
    }

    /// Replaces the service configuration.
    #[must_use]
    pub const fn with_config(mut self, config: TaskEngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &TaskEngineConfig {
        &self.config
    }

    /// Lists the tasks visible to `actor` that match `filter`.
    ///
    /// A missing `per_page` falls back to the configured default and any
    /// size is capped at the configured maximum. An empty result is an
    /// empty page.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for a malformed filter or page
    /// request and [`TaskLifecycleError::Repository`] when the query fails.
    #[tracing::instrument(skip_all, fields(actor_id = %actor.id(), page = page))]
    pub async fn list_tasks(
        &self,
        actor: &User,
        filter: TaskFilter,
        page: u32,
        per_page: Option<u32>,
    ) -> TaskLifecycleResult<Page<Task>> {
        filter.validate()?;
        let request = self.config.page_request(page, per_page)?;
        let query = TaskQuery::new(VisibilityScope::for_actor(actor), filter);
        Ok(self.tasks.list(&query, request).await?)
    }

    /// Returns one task visible to `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when the task does not
    /// exist or is outside the actor's visibility; the two cases are
    /// indistinguishable.
    #[tracing::instrument(skip_all, fields(actor_id = %actor.id(), task_id = %id))]
    pub async fn get_task(&self, actor: &User, id: TaskId) -> TaskLifecycleResult<Task> {
        self.find_visible(actor, id).await
    }

    /// Returns the visible tasks that declared `id` as a dependency.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when `id` itself is not
    /// visible.
    #[tracing::instrument(skip_all, fields(actor_id = %actor.id(), task_id = %id))]
    pub async fn dependents(&self, actor: &User, id: TaskId) -> TaskLifecycleResult<Vec<Task>> {
        self.find_visible(actor, id).await?;
        let scope = VisibilityScope::for_actor(actor);
        let linked = self.tasks.dependents_of(id).await?;
        Ok(linked.into_iter().filter(|task| scope.admits(task)).collect())
    }

    /// Returns the visible tasks `id` declared as dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when `id` itself is not
    /// visible.
    #[tracing::instrument(skip_all, fields(actor_id = %actor.id(), task_id = %id))]
    pub async fn dependencies(&self, actor: &User, id: TaskId) -> TaskLifecycleResult<Vec<Task>> {
        self.find_visible(actor, id).await?;
        let scope = VisibilityScope::for_actor(actor);
        let linked = self.tasks.dependencies_of(id).await?;
        Ok(linked.into_iter().filter(|task| scope.admits(task)).collect())
    }

    /// Creates a pending task owned by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Access`] for non-privileged actors,
    /// [`TaskLifecycleError::Domain`] for an invalid title, and
    /// [`TaskLifecycleError::UserNotFound`] when an assignee does not exist.
    #[tracing::instrument(skip_all, fields(actor_id = %actor.id()))]
    pub async fn create_task(
        &self,
        actor: &User,
        request: CreateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        require_privileged(actor, TaskOperation::Create)?;
        let CreateTaskRequest {
            title,
            description,
            due_date,
            assignees,
        } = request;

        let validated_title = TaskTitle::new(title)?;
        let fields = NewTask {
            description,
            due_date,
            assignees: self.resolve_assignees(assignees).await?,
            ..NewTask::new(validated_title)
        };
        let task = Task::new(fields, actor.id(), &*self.clock);
        self.tasks.store(&task).await?;
        info!(task_id = %task.id(), "created task");
        Ok(task)
    }

    /// Applies detail edits to a task.
    ///
    /// Any status on the request is dropped. A supplied assignee set
    /// replaces the current one in the same write as the other fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Access`] when the actor is not
    /// privileged or the authorizer refuses the update,
    /// [`TaskLifecycleError::TaskNotFound`] when the task does not exist,
    /// [`TaskLifecycleError::Domain`] for an invalid title, and
    /// [`TaskLifecycleError::UserNotFound`] when an assignee does not exist.
    #[tracing::instrument(skip_all, fields(actor_id = %actor.id(), task_id = %request.task()))]
    pub async fn update_task(
        &self,
        actor: &User,
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        require_privileged(actor, TaskOperation::Update)?;
        let UpdateTaskRequest {
            task: id,
            title,
            description,
            due_date,
            assignees,
            status,
        } = request;
        if let Some(ignored) = status {
            debug!(status = %ignored, "status dropped from detail update");
        }

        let mut task = self.find_existing(id).await?;
        if !self.authorizer.can_update(actor, &task, None) {
            debug!("task update refused by authorizer");
            return Err(AccessDenied::UpdateNotPermitted {
                actor: actor.id(),
                task: id,
            }
            .into());
        }

        let resolved_assignees = match assignees {
            Some(candidates) => Some(self.resolve_assignees(candidates).await?),
            None => None,
        };
        let update = TaskDetailsUpdate {
            title: title.map(TaskTitle::new).transpose()?,
            description,
            due_date,
            assignees: resolved_assignees,
        };

        task.apply_details(update, &*self.clock);
        self.tasks.update_details(&task).await?;
        info!("updated task details");
        Ok(task)
    }

    /// Moves a task to a new status after the transition guard approves.
    ///
    /// The task is resolved without the visibility filter, so an existing
    /// task outside the actor's scope is refused by the authorizer rather
    /// than reported missing. Requesting the current status succeeds
    /// without a write.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when the task does not
    /// exist and [`TaskLifecycleError::Transition`] when the guard refuses.
    #[tracing::instrument(
        skip_all,
        fields(actor_id = %actor.id(), task_id = %request.task(), target = %request.target())
    )]
    pub async fn change_status(
        &self,
        actor: &User,
        request: StatusTransitionRequest,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.find_existing(request.task()).await?;
        let dependents = self.tasks.dependents_of(task.id()).await?;
        let decision = self
            .guard
            .evaluate(actor, &task, &dependents, request.target())
            .inspect_err(|denied| debug!(reason = %denied, "status change refused"))?;

        if decision.is_noop() {
            return Ok(task);
        }

        task.apply_transition(&decision, &*self.clock)?;
        self.tasks
            .update_status(task.id(), task.status(), task.updated_at())
            .await?;
        info!(from = %decision.from(), to = %decision.to(), "task status changed");
        Ok(task)
    }

    /// Replaces the full dependent set of a task.
    ///
    /// Self-references are refused before any lookup. Under
    /// [`CyclePolicy::Reject`] a replacement closing a cycle is refused.
    /// Submitting the same set twice leaves the edges unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Access`] for non-privileged actors,
    /// [`TaskLifecycleError::Domain`] for a self-dependency or cycle, and
    /// [`TaskLifecycleError::TaskNotFound`] when the task or a candidate
    /// does not exist.
    #[tracing::instrument(skip_all, fields(actor_id = %actor.id(), task_id = %id))]
    pub async fn set_dependents(
        &self,
        actor: &User,
        id: TaskId,
        candidates: impl IntoIterator<Item = TaskId>,
    ) -> TaskLifecycleResult<Task> {
        require_privileged(actor, TaskOperation::SetDependents)?;
        let replacement = DependentSet::new(id, candidates)?;
        let task = self.find_existing(id).await?;

        if self.config.cycle_policy == CyclePolicy::Reject {
            let edges = self.tasks.dependency_edges().await?;
            self.config
                .cycle_policy
                .check(&edges, &replacement)
                .inspect_err(|err| debug!(reason = %err, "dependent set refused"))?;
        }

        self.tasks.replace_dependents(&replacement).await?;
        info!(
            dependents = replacement.dependents().len(),
            "replaced task dependents"
        );
        Ok(task)
    }

    async fn find_existing(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or(TaskLifecycleError::TaskNotFound(id))
    }

    async fn find_visible(&self, actor: &User, id: TaskId) -> TaskLifecycleResult<Task> {
        let scope = VisibilityScope::for_actor(actor);
        self.tasks
            .find_by_id(id)
            .await?
            .filter(|task| scope.admits(task))
            .ok_or(TaskLifecycleError::TaskNotFound(id))
    }

    async fn resolve_assignees(
        &self,
        candidates: Vec<UserId>,
    ) -> TaskLifecycleResult<BTreeSet<UserId>> {
        let mut assignees = BTreeSet::new();
        for candidate in candidates {
            if assignees.contains(&candidate) {
                continue;
            }
            self.users
                .find_by_id(candidate)
                .await?
                .ok_or(TaskLifecycleError::UserNotFound(candidate))?;
            assignees.insert(candidate);
        }
        Ok(assignees)
    }
}

fn require_privileged(actor: &User, operation: TaskOperation) -> TaskLifecycleResult<()> {
    if actor.role().is_privileged() {
        return Ok(());
    }
    debug!(operation = %operation, "privileged task operation refused");
    Err(AccessDenied::PrivilegeRequired {
        actor: actor.id(),
        operation,
    }
    .into())
}
