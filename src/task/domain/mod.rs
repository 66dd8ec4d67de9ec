//! Domain model for tasks, their dependency graph, visibility, and status
//! transitions.
//!
//! All infrastructure concerns are kept outside the domain boundary.

mod dependency;
mod error;
mod filter;
mod ids;
mod page;
mod status;
mod task;
mod transition;
mod visibility;

pub use dependency::{CyclePolicy, DependencyEdge, DependentSet, has_unresolved_dependents};
pub use error::{ParseTaskStatusError, TaskDomainError};
pub use filter::{TaskFilter, TaskQuery};
pub use ids::{TaskId, TaskTitle};
pub use page::{DEFAULT_PAGE_SIZE, Page, PageRequest};
pub use status::TaskStatus;
pub use task::{NewTask, PersistedTaskData, Task, TaskDetailsUpdate};
pub use transition::{StatusTransitionRequest, TransitionDecision, TransitionDenied};
pub use visibility::VisibilityScope;
