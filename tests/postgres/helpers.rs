//! Shared test helpers for `PostgreSQL` integration tests.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use pg_embedded_setup_unpriv::TestCluster;
use std::collections::BTreeSet;
use taskward::task::{
    adapters::postgres::PostgresTaskRepository,
    domain::{PersistedTaskData, Task, TaskId, TaskStatus, TaskTitle},
    ports::TaskRepository,
};
use taskward::user::{
    adapters::postgres::PostgresUserRepository,
    domain::{EmailAddress, PersistedUserData, Role, User, UserId, UserName},
    ports::UserRepository,
};
use tokio::runtime::Runtime;

/// SQL creating the users, tasks, assignee, and dependency tables.
pub const CREATE_TABLES_SQL: &str =
    include_str!("../../migrations/2026-01-12-000000_create_task_tables/up.sql");

/// Template database name for pre-migrated schema.
pub const TEMPLATE_DB: &str = "taskward_test_template";

/// Boxed error used by setup helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Creates a tokio runtime for async operations in tests.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_TABLES_SQL)
                .map_err(|e| eyre::eyre!("migration failed: {e}"))?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

/// Creates a test database from the template and returns both repositories
/// over one single-connection pool.
///
/// # Errors
///
/// Returns an error if database creation or pool setup fails.
pub fn setup_repositories(
    cluster: &TestCluster,
    db_name: &str,
) -> Result<(PostgresTaskRepository, PostgresUserRepository), BoxError> {
    cluster
        .create_database_from_template(db_name, TEMPLATE_DB)
        .map_err(|e| Box::new(e) as BoxError)?;
    let url = cluster.connection().database_url(db_name);
    let manager = ConnectionManager::<PgConnection>::new(url);
    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok((
        PostgresTaskRepository::new(pool.clone()),
        PostgresUserRepository::new(pool),
    ))
}

/// Guard that drops the test database even if the test panics.
pub struct CleanupGuard<'a> {
    cluster: &'a TestCluster,
    db_name: String,
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.db_name);
        }
    }
}

/// A migrated database with repositories and a runtime to drive them.
///
/// Fields drop in declaration order, so the pool closes before the guard
/// drops the database.
pub struct TestDatabase<'a> {
    /// Task repository over the test database.
    pub tasks: PostgresTaskRepository,
    /// User repository sharing the task repository's pool.
    pub users: PostgresUserRepository,
    /// Current-thread runtime for `block_on`.
    pub runtime: Runtime,
    _guard: CleanupGuard<'a>,
}

impl<'a> TestDatabase<'a> {
    /// Creates a fresh database named after `prefix`.
    pub fn create(cluster: &'a TestCluster, prefix: &str) -> Self {
        ensure_template(cluster).expect("template setup");
        let db_name = format!("{prefix}_{}", uuid::Uuid::new_v4().simple());
        let guard = CleanupGuard {
            cluster,
            db_name: db_name.clone(),
        };
        let (tasks, users) = setup_repositories(cluster, &db_name).expect("repository setup");
        Self {
            tasks,
            users,
            runtime: test_runtime(),
            _guard: guard,
        }
    }

    /// Stores a user holding `role`.
    pub fn seed_user(&self, name: &str, role: Role) -> User {
        let user = user_with_role(name, role);
        self.runtime
            .block_on(self.users.store(&user))
            .expect("seeding a user should succeed");
        user
    }

    /// Stores a task built from `data`.
    pub fn seed_task(&self, data: PersistedTaskData) -> Task {
        let task = Task::from_persisted(data);
        self.runtime
            .block_on(self.tasks.store(&task))
            .expect("seeding a task should succeed");
        task
    }
}

/// Builds a user holding `role` with an address derived from `name`.
pub fn user_with_role(name: &str, role: Role) -> User {
    let now = base_time();
    User::from_persisted(PersistedUserData {
        id: UserId::new(),
        name: UserName::new(name).expect("valid fixture name"),
        email: EmailAddress::new(format!("{}@example.com", name.to_lowercase()))
            .expect("valid fixture email"),
        role,
        created_at: now,
        updated_at: now,
    })
}

/// Fixed whole-second instant so stored timestamps compare exactly.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .expect("valid base time")
}

/// Field values for a pending, unassigned task created `minute` minutes
/// after [`base_time`].
pub fn task_data(title: &str, owner: UserId, minute: i64) -> PersistedTaskData {
    let created = base_time() + Duration::minutes(minute);
    PersistedTaskData {
        id: TaskId::new(),
        title: TaskTitle::new(title).expect("valid fixture title"),
        description: None,
        status: TaskStatus::Pending,
        due_date: None,
        owner,
        assignees: BTreeSet::new(),
        created_at: created,
        updated_at: created,
    }
}

/// Parses a calendar date in fixture tables.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// Returns task identifiers in page order.
pub fn ids(tasks: &[Task]) -> Vec<TaskId> {
    tasks.iter().map(Task::id).collect()
}
