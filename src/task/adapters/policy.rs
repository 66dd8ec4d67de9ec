//! Role-based implementation of the task authorization port.

use crate::task::{
    domain::{Task, TaskStatus},
    ports::TaskAuthorizer,
};
use crate::user::domain::User;

/// Default update policy.
///
/// Admins and managers may update any task. Other users may update tasks
/// they own or are assigned to, but may never request cancellation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleBasedTaskAuthorizer;

impl RoleBasedTaskAuthorizer {
    /// Creates the policy.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TaskAuthorizer for RoleBasedTaskAuthorizer {
    fn can_update(&self, actor: &User, task: &Task, requested_status: Option<TaskStatus>) -> bool {
        if actor.role().is_privileged() {
            return true;
        }
        if requested_status == Some(TaskStatus::Cancelled) {
            return false;
        }
        task.is_owned_by(actor.id()) || task.is_assigned_to(actor.id())
    }
}
