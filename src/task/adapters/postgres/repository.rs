//! `PostgreSQL` repository implementation for tasks and dependency edges.

use super::{
    models::{DependencyRow, NewAssigneeRow, NewTaskRow, TaskDetailsChangeset, TaskRow},
    schema::{task_assignees, task_dependencies, tasks},
};
use crate::task::{
    domain::{
        DependencyEdge, DependentSet, Page, PageRequest, PersistedTaskData, Task, TaskId,
        TaskQuery, TaskStatus, TaskTitle, VisibilityScope,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::user::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

type BoxedTaskQuery = tasks::BoxedQuery<'static, Pg>;

type AssigneeMap = HashMap<Uuid, BTreeSet<UserId>>;

/// `PostgreSQL`-backed task repository.
///
/// Multi-row writes run inside a single transaction.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);
        let assignees = assignee_rows(task);

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                diesel::insert_into(tasks::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateTask(task_id)
                        }
                        _ => TaskRepositoryError::persistence(err),
                    })?;
                if !assignees.is_empty() {
                    diesel::insert_into(task_assignees::table)
                        .values(&assignees)
                        .execute(tx)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn update_details(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changeset = TaskDetailsChangeset {
            title: task.title().as_str().to_owned(),
            description: task.description().map(str::to_owned),
            due_date: task.due_date(),
            updated_at: task.updated_at(),
        };
        let assignees = assignee_rows(task);

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let updated = diesel::update(tasks::table.find(task_id.into_inner()))
                    .set(&changeset)
                    .execute(tx)?;
                if updated == 0 {
                    return Err(TaskRepositoryError::NotFound(task_id));
                }

                diesel::delete(
                    task_assignees::table.filter(task_assignees::task_id.eq(task_id.into_inner())),
                )
                .execute(tx)?;
                if !assignees.is_empty() {
                    diesel::insert_into(task_assignees::table)
                        .values(&assignees)
                        .execute(tx)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.find(id.into_inner()))
                .set((
                    tasks::status.eq(status.as_str()),
                    tasks::updated_at.eq(updated_at),
                ))
                .execute(connection)?;
            if updated == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            let Some(task_row) = row else {
                return Ok(None);
            };
            let mut assignees = load_assignees(connection, &[task_row.id])?;
            let members = assignees.remove(&task_row.id).unwrap_or_default();
            row_to_task(task_row, members).map(Some)
        })
        .await
    }

    async fn list(&self, query: &TaskQuery, page: PageRequest) -> TaskRepositoryResult<Page<Task>> {
        let owned_query = query.clone();
        self.run_blocking(move |connection| {
            let offset = i64::try_from(page.offset()).map_err(TaskRepositoryError::persistence)?;
            let limit = i64::from(page.per_page());

            let total: i64 = apply_query(tasks::table.into_boxed(), &owned_query)
                .count()
                .get_result(connection)?;
            let rows = apply_query(tasks::table.into_boxed(), &owned_query)
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .offset(offset)
                .limit(limit)
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;

            let items = rows_to_tasks(connection, rows)?;
            let total_count = u64::try_from(total).map_err(TaskRepositoryError::persistence)?;
            Ok(Page::new(items, page, total_count))
        })
        .await
    }

    async fn replace_dependents(&self, dependents: &DependentSet) -> TaskRepositoryResult<()> {
        let replacement = dependents.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let task_id = replacement.task();
                let exists = tasks::table
                    .find(task_id.into_inner())
                    .select(tasks::id)
                    .first::<Uuid>(tx)
                    .optional()?;
                if exists.is_none() {
                    return Err(TaskRepositoryError::NotFound(task_id));
                }

                let wanted: Vec<Uuid> = replacement
                    .dependents()
                    .iter()
                    .map(|id| id.into_inner())
                    .collect();
                let found: BTreeSet<Uuid> = tasks::table
                    .filter(tasks::id.eq_any(wanted))
                    .select(tasks::id)
                    .load::<Uuid>(tx)?
                    .into_iter()
                    .collect();
                if let Some(missing) = replacement
                    .dependents()
                    .iter()
                    .find(|id| !found.contains(&id.into_inner()))
                {
                    return Err(TaskRepositoryError::NotFound(*missing));
                }

                diesel::delete(
                    task_dependencies::table
                        .filter(task_dependencies::dependency_id.eq(task_id.into_inner())),
                )
                .execute(tx)?;
                let edges: Vec<DependencyRow> =
                    replacement.edges().map(to_dependency_row).collect();
                if !edges.is_empty() {
                    diesel::insert_into(task_dependencies::table)
                        .values(&edges)
                        .execute(tx)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn dependents_of(&self, id: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let linked = task_dependencies::table
                .filter(task_dependencies::dependency_id.eq(id.into_inner()))
                .select(task_dependencies::dependent_id);
            let rows = tasks::table
                .filter(tasks::id.eq_any(linked))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows_to_tasks(connection, rows)
        })
        .await
    }

    async fn dependencies_of(&self, id: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let linked = task_dependencies::table
                .filter(task_dependencies::dependent_id.eq(id.into_inner()))
                .select(task_dependencies::dependency_id);
            let rows = tasks::table
                .filter(tasks::id.eq_any(linked))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows_to_tasks(connection, rows)
        })
        .await
    }

    async fn dependency_edges(&self) -> TaskRepositoryResult<Vec<DependencyEdge>> {
        self.run_blocking(move |connection| {
            let rows = task_dependencies::table
                .order((
                    task_dependencies::dependency_id.asc(),
                    task_dependencies::dependent_id.asc(),
                ))
                .select(DependencyRow::as_select())
                .load::<DependencyRow>(connection)?;
            rows.into_iter().map(row_to_edge).collect()
        })
        .await
    }
}

fn apply_query(mut select: BoxedTaskQuery, query: &TaskQuery) -> BoxedTaskQuery {
    if let VisibilityScope::Restricted(user) = query.scope() {
        let uid = user.into_inner();
        select = select.filter(
            tasks::owner_id.eq(uid).or(tasks::id.eq_any(
                task_assignees::table
                    .filter(task_assignees::user_id.eq(uid))
                    .select(task_assignees::task_id),
            )),
        );
    }

    let filter = query.filter();
    if let Some(status) = filter.status() {
        select = select.filter(tasks::status.eq(status.as_str()));
    }
    if let Some(needle) = filter.title() {
        select = select.filter(tasks::title.ilike(contains_pattern(needle)));
    }
    if let Some(owner) = filter.owner() {
        select = select.filter(tasks::owner_id.eq(owner.into_inner()));
    }
    if let Some(assignee) = filter.assignee() {
        select = select.filter(
            tasks::id.eq_any(
                task_assignees::table
                    .filter(task_assignees::user_id.eq(assignee.into_inner()))
                    .select(task_assignees::task_id),
            ),
        );
    }
    // NULL due dates fall out of both comparisons.
    if let Some(from) = filter.due_from() {
        select = select.filter(tasks::due_date.ge(from));
    }
    if let Some(to) = filter.due_to() {
        select = select.filter(tasks::due_date.le(to));
    }
    select
}

/// Builds an `ILIKE` pattern matching `needle` anywhere, with wildcards in
/// the needle escaped.
pub(super) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn load_assignees(
    connection: &mut PgConnection,
    task_ids: &[Uuid],
) -> TaskRepositoryResult<AssigneeMap> {
    let pairs = task_assignees::table
        .filter(task_assignees::task_id.eq_any(task_ids.to_vec()))
        .select((task_assignees::task_id, task_assignees::user_id))
        .load::<(Uuid, Uuid)>(connection)?;

    let mut assignees = AssigneeMap::new();
    for (task_id, user_id) in pairs {
        assignees
            .entry(task_id)
            .or_default()
            .insert(UserId::from_uuid(user_id));
    }
    Ok(assignees)
}

fn rows_to_tasks(
    connection: &mut PgConnection,
    rows: Vec<TaskRow>,
) -> TaskRepositoryResult<Vec<Task>> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut assignees = load_assignees(connection, &ids)?;
    rows.into_iter()
        .map(|row| {
            let members = assignees.remove(&row.id).unwrap_or_default();
            row_to_task(row, members)
        })
        .collect()
}

fn assignee_rows(task: &Task) -> Vec<NewAssigneeRow> {
    task.assignees()
        .iter()
        .map(|user| NewAssigneeRow {
            task_id: task.id().into_inner(),
            user_id: user.into_inner(),
        })
        .collect()
}

const fn to_dependency_row(edge: DependencyEdge) -> DependencyRow {
    DependencyRow {
        dependency_id: edge.dependency().into_inner(),
        dependent_id: edge.dependent().into_inner(),
    }
}

pub(super) fn row_to_edge(row: DependencyRow) -> TaskRepositoryResult<DependencyEdge> {
    DependencyEdge::new(
        TaskId::from_uuid(row.dependency_id),
        TaskId::from_uuid(row.dependent_id),
    )
    .map_err(TaskRepositoryError::persistence)
}

pub(super) fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        status: task.status().as_str().to_owned(),
        due_date: task.due_date(),
        owner_id: task.owner().into_inner(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

pub(super) fn row_to_task(
    row: TaskRow,
    assignees: BTreeSet<UserId>,
) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        title,
        description,
        status,
        due_date,
        owner_id,
        created_at,
        updated_at,
    } = row;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        title: TaskTitle::new(title).map_err(TaskRepositoryError::persistence)?,
        description,
        status: TaskStatus::try_from(status.as_str()).map_err(TaskRepositoryError::persistence)?,
        due_date,
        owner: UserId::from_uuid(owner_id),
        assignees,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}
