//! Shared test helpers for in-memory integration tests.

use chrono::Utc;
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;
use taskward::task::{
    adapters::{memory::InMemoryTaskRepository, policy::RoleBasedTaskAuthorizer},
    domain::{StatusTransitionRequest, Task, TaskStatus},
    services::{CreateTaskRequest, TaskLifecycleService},
};
use taskward::user::{
    adapters::memory::InMemoryUserRepository,
    domain::{EmailAddress, PersistedUserData, Role, User, UserId, UserName},
    ports::UserRepository,
    services::UserAccountService,
};

/// Task service wired to in-memory adapters.
pub type TaskService = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryUserRepository,
    RoleBasedTaskAuthorizer,
    DefaultClock,
>;

/// Account service wired to the same user repository.
pub type AccountService = UserAccountService<InMemoryUserRepository, DefaultClock>;

/// Both services sharing one pair of repositories.
#[derive(Clone)]
pub struct Engine {
    /// Task repository backing the task service.
    pub tasks: Arc<InMemoryTaskRepository>,
    /// User repository shared by both services.
    pub users: Arc<InMemoryUserRepository>,
    /// Task lifecycle coordinator.
    pub task_service: TaskService,
    /// Account service.
    pub accounts: AccountService,
}

impl Engine {
    /// Stores a user with a fixed role, bypassing registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is invalid or the store fails.
    pub async fn seed_user(&self, name: &str, role: Role) -> Result<User, eyre::Report> {
        let now = Utc::now();
        let user = User::from_persisted(PersistedUserData {
            id: UserId::new(),
            name: UserName::new(name)?,
            email: EmailAddress::new(format!("{}@example.com", name.to_lowercase()))?,
            role,
            created_at: now,
            updated_at: now,
        });
        self.users.store(&user).await?;
        Ok(user)
    }

    /// Creates a task through the service on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the service refuses the creation.
    pub async fn create_task(
        &self,
        actor: &User,
        title: &str,
        assignees: &[UserId],
    ) -> Result<Task, eyre::Report> {
        let request = CreateTaskRequest::new(title).with_assignees(assignees.iter().copied());
        Ok(self.task_service.create_task(actor, request).await?)
    }

    /// Moves a task to `target` on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the guard refuses the transition.
    pub async fn move_task(
        &self,
        actor: &User,
        task: &Task,
        target: TaskStatus,
    ) -> Result<Task, eyre::Report> {
        let request = StatusTransitionRequest::new(task.id(), target);
        Ok(self.task_service.change_status(actor, request).await?)
    }
}

/// Provides both services over fresh in-memory repositories.
#[fixture]
pub fn engine() -> Engine {
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let clock = Arc::new(DefaultClock);
    let task_service = TaskLifecycleService::new(
        Arc::clone(&tasks),
        Arc::clone(&users),
        Arc::new(RoleBasedTaskAuthorizer::new()),
        Arc::clone(&clock),
    );
    let accounts = UserAccountService::new(Arc::clone(&users), clock);
    Engine {
        tasks,
        users,
        task_service,
        accounts,
    }
}
