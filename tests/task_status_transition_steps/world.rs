//! Shared state for task status transition scenarios.

use chrono::Utc;
use eyre::eyre;
use mockable::DefaultClock;
use rstest::fixture;
use std::collections::HashMap;
use std::sync::Arc;
use taskward::task::{
    adapters::{memory::InMemoryTaskRepository, policy::RoleBasedTaskAuthorizer},
    domain::Task,
    services::{TaskLifecycleError, TaskLifecycleService},
};
use taskward::user::{
    adapters::memory::InMemoryUserRepository,
    domain::{EmailAddress, PersistedUserData, Role, User, UserId, UserName},
    ports::UserRepository,
};

/// Service type exercised by the scenarios.
pub type ScenarioService = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryUserRepository,
    RoleBasedTaskAuthorizer,
    DefaultClock,
>;

/// Scenario world for task transition behaviour tests.
pub struct TaskEngineWorld {
    /// Task repository shared with the service.
    pub tasks: Arc<InMemoryTaskRepository>,
    /// User repository shared with the service.
    pub users: Arc<InMemoryUserRepository>,
    /// Service under test.
    pub service: ScenarioService,
    /// Admin used to arrange scenario state.
    pub operator: User,
    /// Users keyed by display name.
    pub people: HashMap<String, User>,
    /// Tasks keyed by title.
    pub tasks_by_title: HashMap<String, Task>,
    /// Outcome of the latest mutating request.
    pub last_outcome: Option<Result<(), TaskLifecycleError>>,
    /// Titles returned by the latest listing.
    pub visible_titles: Vec<String>,
}

impl TaskEngineWorld {
    /// Creates a world backed by fresh in-memory repositories.
    #[must_use]
    pub fn new() -> Self {
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let service = TaskLifecycleService::new(
            Arc::clone(&tasks),
            Arc::clone(&users),
            Arc::new(RoleBasedTaskAuthorizer::new()),
            Arc::new(DefaultClock),
        );
        let operator = scenario_user("Operator", Role::Admin)
            .expect("operator fixture should be valid");
        Self {
            tasks,
            users,
            service,
            operator,
            people: HashMap::new(),
            tasks_by_title: HashMap::new(),
            last_outcome: None,
            visible_titles: Vec::new(),
        }
    }

    /// Registers a user with a fixed role directly in the repository.
    pub fn add_person(&mut self, name: &str, role: Role) -> Result<(), eyre::Report> {
        let user = scenario_user(name, role)?;
        run_async(self.users.store(&user))?;
        self.people.insert(name.to_owned(), user);
        Ok(())
    }

    /// Returns the user registered under `name`.
    pub fn person(&self, name: &str) -> Result<&User, eyre::Report> {
        self.people
            .get(name)
            .ok_or_else(|| eyre!("unknown person in scenario: {name}"))
    }

    /// Returns the task recorded under `title`.
    pub fn task(&self, title: &str) -> Result<&Task, eyre::Report> {
        self.tasks_by_title
            .get(title)
            .ok_or_else(|| eyre!("unknown task in scenario: {title}"))
    }

    /// Returns the error captured by the latest request.
    pub fn last_error(&self) -> Result<&TaskLifecycleError, eyre::Report> {
        match &self.last_outcome {
            Some(Err(err)) => Ok(err),
            Some(Ok(())) => Err(eyre!("expected the request to fail")),
            None => Err(eyre!("no request has been made")),
        }
    }
}

impl Default for TaskEngineWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn scenario_user(name: &str, role: Role) -> Result<User, eyre::Report> {
    let now = Utc::now();
    let local_part: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase();
    Ok(User::from_persisted(PersistedUserData {
        id: UserId::new(),
        name: UserName::new(name)?,
        email: EmailAddress::new(format!("{local_part}@example.com"))?,
        role,
        created_at: now,
        updated_at: now,
    }))
}

/// Fixture providing a fresh scenario world.
#[fixture]
pub fn world() -> TaskEngineWorld {
    TaskEngineWorld::new()
}

/// Runs an async operation from a synchronous step definition.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
