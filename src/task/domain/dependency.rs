//! Dependency edges between tasks and the rules for replacing them.
//!
//! An edge `(dependency, dependent)` reads "`dependent` depends on
//! `dependency`". For a task `T`, the dependents of `T` are the tasks that
//! declared `T` as a dependency; it is the dependents, not the
//! dependencies, that gate a status change on `T`.

use super::{Task, TaskDomainError, TaskId};
use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Directed "depends on" edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    dependency: TaskId,
    dependent: TaskId,
}

impl DependencyEdge {
    /// Creates an edge recording that `dependent` depends on `dependency`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SelfDependency`] when both ends are the
    /// same task.
    pub fn new(dependency: TaskId, dependent: TaskId) -> Result<Self, TaskDomainError> {
        if dependency == dependent {
            return Err(TaskDomainError::SelfDependency(dependency));
        }
        Ok(Self {
            dependency,
            dependent,
        })
    }

    /// Returns the task that is depended upon.
    #[must_use]
    pub const fn dependency(&self) -> TaskId {
        self.dependency
    }

    /// Returns the task that declared the dependency.
    #[must_use]
    pub const fn dependent(&self) -> TaskId {
        self.dependent
    }
}

/// Validated replacement for the full dependent set of one task.
///
/// Candidates are deduplicated; the set never contains the task itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentSet {
    task: TaskId,
    dependents: BTreeSet<TaskId>,
}

impl DependentSet {
    /// Builds the replacement dependent set for `task`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SelfDependency`] when `task` appears among
    /// the candidates.
    pub fn new(
        task: TaskId,
        candidates: impl IntoIterator<Item = TaskId>,
    ) -> Result<Self, TaskDomainError> {
        let mut dependents = BTreeSet::new();
        for candidate in candidates {
            if candidate == task {
                return Err(TaskDomainError::SelfDependency(task));
            }
            dependents.insert(candidate);
        }
        Ok(Self { task, dependents })
    }

    /// Returns the task whose dependents are replaced.
    #[must_use]
    pub const fn task(&self) -> TaskId {
        self.task
    }

    /// Returns the replacement dependent identifiers.
    #[must_use]
    pub const fn dependents(&self) -> &BTreeSet<TaskId> {
        &self.dependents
    }

    /// Returns `true` when the replacement clears every dependent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }

    /// Returns the edges the replacement establishes.
    pub fn edges(&self) -> impl Iterator<Item = DependencyEdge> + '_ {
        self.dependents.iter().map(|dependent| DependencyEdge {
            dependency: self.task,
            dependent: *dependent,
        })
    }
}

/// How a dependent-set replacement treats dependency cycles longer than a
/// self-edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Only self-edges are refused; longer cycles are stored as given.
    #[default]
    Allow,
    /// A replacement that would close any cycle is refused.
    Reject,
}

impl CyclePolicy {
    /// Checks a replacement against the current edge set.
    ///
    /// `existing` is the full edge set before the replacement; edges whose
    /// dependency is the replaced task are discarded in favour of the
    /// replacement.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DependencyCycle`] under
    /// [`CyclePolicy::Reject`] when the resulting graph is cyclic.
    pub fn check(
        self,
        existing: &[DependencyEdge],
        replacement: &DependentSet,
    ) -> Result<(), TaskDomainError> {
        match self {
            Self::Allow => Ok(()),
            Self::Reject => {
                if would_be_cyclic(existing, replacement) {
                    Err(TaskDomainError::DependencyCycle(replacement.task()))
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn would_be_cyclic(existing: &[DependencyEdge], replacement: &DependentSet) -> bool {
    let mut graph = DiGraphMap::<TaskId, ()>::new();
    for edge in existing
        .iter()
        .filter(|edge| edge.dependency != replacement.task())
    {
        graph.add_edge(edge.dependency, edge.dependent, ());
    }
    for edge in replacement.edges() {
        graph.add_edge(edge.dependency, edge.dependent, ());
    }
    is_cyclic_directed(&graph)
}

/// Returns `true` when at least one direct dependent is still pending or
/// in progress. Dependents of dependents are not examined.
#[must_use]
pub fn has_unresolved_dependents(dependents: &[Task]) -> bool {
    dependents
        .iter()
        .any(|dependent| dependent.status().is_unresolved())
}
