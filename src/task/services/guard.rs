//! Status transition guard.

use crate::task::{
    domain::{
        Task, TaskStatus, TransitionDecision, TransitionDenied, has_unresolved_dependents,
    },
    ports::TaskAuthorizer,
};
use crate::user::domain::User;
use std::sync::Arc;

/// Decides whether an actor may move a task to a requested status.
///
/// Checks run in a fixed order:
///
/// 1. the authorization collaborator must grant the update for the target
///    status;
/// 2. a plain user may not move a task while any direct dependent is still
///    pending or in progress, whatever the target;
/// 3. a target equal to the current status is an idempotent no-op.
#[derive(Debug)]
pub struct StatusTransitionGuard<A> {
    authorizer: Arc<A>,
}

impl<A> Clone for StatusTransitionGuard<A> {
    fn clone(&self) -> Self {
        Self {
            authorizer: Arc::clone(&self.authorizer),
        }
    }
}

impl<A> StatusTransitionGuard<A>
where
    A: TaskAuthorizer,
{
    /// Creates a guard that consults `authorizer`.
    #[must_use]
    pub const fn new(authorizer: Arc<A>) -> Self {
        Self { authorizer }
    }

    /// Evaluates a transition of `task` to `target`.
    ///
    /// `dependents` are the direct dependents of `task`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionDenied::NotPermitted`] when the authorizer
    /// refuses and [`TransitionDenied::UnresolvedDependents`] when a plain
    /// user is blocked by open dependents.
    pub fn evaluate(
        &self,
        actor: &User,
        task: &Task,
        dependents: &[Task],
        target: TaskStatus,
    ) -> Result<TransitionDecision, TransitionDenied> {
        if !self.authorizer.can_update(actor, task, Some(target)) {
            return Err(TransitionDenied::NotPermitted {
                actor: actor.id(),
                task: task.id(),
                requested: target,
            });
        }

        if actor.role().is_plain_user() && has_unresolved_dependents(dependents) {
            let unresolved = dependents
                .iter()
                .filter(|dependent| dependent.status().is_unresolved())
                .count();
            return Err(TransitionDenied::UnresolvedDependents {
                task: task.id(),
                unresolved,
            });
        }

        Ok(TransitionDecision::new(task.id(), task.status(), target))
    }
}
