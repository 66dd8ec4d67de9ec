//! In-memory repository for tasks and their dependency edges.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{
        DependencyEdge, DependentSet, Page, PageRequest, PersistedTaskData, Task, TaskId,
        TaskQuery, TaskStatus,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Every mutation runs under one write lock, which makes each call atomic
/// with respect to concurrent readers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    // Keyed by the task depended upon.
    dependents: HashMap<TaskId, DependentSet>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state
            .read()
            .map_err(|err| TaskRepositoryError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state
            .write()
            .map_err(|err| TaskRepositoryError::persistence(std::io::Error::other(err.to_string())))
    }
}

/// Resolves identifiers to tasks in creation order, skipping unknown ids.
fn collect_tasks<'a>(
    state: &InMemoryTaskState,
    ids: impl IntoIterator<Item = &'a TaskId>,
) -> Vec<Task> {
    let mut tasks: Vec<Task> = ids
        .into_iter()
        .filter_map(|id| state.tasks.get(id).cloned())
        .collect();
    sort_by_creation(&mut tasks);
    tasks
}

fn sort_by_creation(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| (task.created_at(), task.id()));
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_details(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored_status = state
            .tasks
            .get(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?
            .status();

        let updated = Task::from_persisted(PersistedTaskData {
            status: stored_status,
            ..task.to_persisted()
        });
        state.tasks.insert(task.id(), updated);
        Ok(())
    }

    async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get_mut(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;

        *stored = Task::from_persisted(PersistedTaskData {
            status,
            updated_at,
            ..stored.to_persisted()
        });
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list(&self, query: &TaskQuery, page: PageRequest) -> TaskRepositoryResult<Page<Task>> {
        let state = self.read()?;
        let mut matching: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| query.matches(task))
            .cloned()
            .collect();
        sort_by_creation(&mut matching);

        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let items = matching
            .into_iter()
            .skip(to_usize(page.offset()))
            .take(to_usize(u64::from(page.per_page())))
            .collect();
        Ok(Page::new(items, page, total))
    }

    async fn replace_dependents(&self, dependents: &DependentSet) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let task_id = dependents.task();
        if !state.tasks.contains_key(&task_id) {
            return Err(TaskRepositoryError::NotFound(task_id));
        }
        if let Some(missing) = dependents
            .dependents()
            .iter()
            .find(|id| !state.tasks.contains_key(*id))
        {
            return Err(TaskRepositoryError::NotFound(*missing));
        }

        if dependents.is_empty() {
            state.dependents.remove(&task_id);
        } else {
            state.dependents.insert(task_id, dependents.clone());
        }
        Ok(())
    }

    async fn dependents_of(&self, id: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let tasks = state
            .dependents
            .get(&id)
            .map(|set| collect_tasks(&state, set.dependents()))
            .unwrap_or_default();
        Ok(tasks)
    }

    async fn dependencies_of(&self, id: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let dependency_ids: Vec<TaskId> = state
            .dependents
            .values()
            .filter(|set| set.dependents().contains(&id))
            .map(DependentSet::task)
            .collect();
        Ok(collect_tasks(&state, &dependency_ids))
    }

    async fn dependency_edges(&self) -> TaskRepositoryResult<Vec<DependencyEdge>> {
        let state = self.read()?;
        let mut edges: Vec<DependencyEdge> = state
            .dependents
            .values()
            .flat_map(|set| set.edges())
            .collect();
        edges.sort();
        Ok(edges)
    }
}
