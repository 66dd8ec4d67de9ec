//! Visibility scope of an actor over the task universe.

use super::Task;
use crate::user::domain::{User, UserId};

/// The subset of tasks an actor may read.
///
/// Computed per request from the actor's current role; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibilityScope {
    /// Every task (admins and managers).
    Unrestricted,
    /// Tasks the user owns or is assigned to.
    Restricted(UserId),
}

impl VisibilityScope {
    /// Returns the scope for `actor`.
    #[must_use]
    pub fn for_actor(actor: &User) -> Self {
        if actor.role().is_privileged() {
            Self::Unrestricted
        } else {
            Self::Restricted(actor.id())
        }
    }

    /// Returns `true` when `task` lies inside the scope.
    #[must_use]
    pub fn admits(&self, task: &Task) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted(user) => task.is_owned_by(*user) || task.is_assigned_to(*user),
        }
    }
}
