//! Authorization port deciding whether an actor may update a task.

use crate::task::domain::{Task, TaskStatus};
use crate::user::domain::User;

/// Update-capability check delegated by the status transition guard and
/// the detail-update path.
pub trait TaskAuthorizer: Send + Sync {
    /// Returns `true` when `actor` may update `task`.
    ///
    /// `requested_status` carries the target of a status change, or `None`
    /// for a non-status update, so implementations can restrict
    /// cancellation to managers and admins.
    fn can_update(&self, actor: &User, task: &Task, requested_status: Option<TaskStatus>) -> bool;
}
