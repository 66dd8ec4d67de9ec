//! Explicit role reassignment command and its validation outcome.
//!
//! A role is never written directly. Callers build a [`RoleChangeRequest`],
//! validate it against the acting user and the resolved target, and apply
//! the resulting [`RoleChange`] to the target aggregate.

use super::{Role, User, UserId};
use thiserror::Error;

/// Request to assign `role` to the user identified by `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleChangeRequest {
    target: UserId,
    role: Role,
}

impl RoleChangeRequest {
    /// Creates a role change request.
    #[must_use]
    pub const fn new(target: UserId, role: Role) -> Self {
        Self { target, role }
    }

    /// Returns the user whose role should change.
    #[must_use]
    pub const fn target(&self) -> UserId {
        self.target
    }

    /// Returns the requested role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Checks the one rule that needs no target: only admins reassign
    /// roles. Services run it before resolving the target.
    ///
    /// # Errors
    ///
    /// Returns [`RoleChangeDenied::ActorNotAdmin`] for non-admin actors.
    pub const fn authorize_actor(actor: &User) -> Result<(), RoleChangeDenied> {
        if actor.role().can_reassign_roles() {
            Ok(())
        } else {
            Err(RoleChangeDenied::ActorNotAdmin {
                actor: actor.id(),
                role: actor.role(),
            })
        }
    }

    /// Validates the request against the acting user and the resolved
    /// target.
    ///
    /// Checks run in order: the actor must be an admin, the actor must not
    /// be the target, and the target must not already be an admin.
    ///
    /// # Errors
    ///
    /// Returns the first [`RoleChangeDenied`] rule the request violates.
    pub fn validate(&self, actor: &User, target: &User) -> Result<RoleChange, RoleChangeDenied> {
        Self::authorize_actor(actor)?;
        if actor.id() == target.id() {
            return Err(RoleChangeDenied::SelfRoleChange(actor.id()));
        }
        if target.role() == Role::Admin {
            return Err(RoleChangeDenied::AdminTarget(target.id()));
        }
        Ok(RoleChange {
            target: target.id(),
            from: target.role(),
            to: self.role,
        })
    }
}

/// A role change that passed validation.
///
/// Only [`RoleChangeRequest::validate`] constructs this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleChange {
    target: UserId,
    from: Role,
    to: Role,
}

impl RoleChange {
    /// Returns the user the change applies to.
    #[must_use]
    pub const fn target(&self) -> UserId {
        self.target
    }

    /// Returns the role held before the change.
    #[must_use]
    pub const fn from(&self) -> Role {
        self.from
    }

    /// Returns the role held after the change.
    #[must_use]
    pub const fn to(&self) -> Role {
        self.to
    }
}

/// Reasons a role change request is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleChangeDenied {
    /// Only admins may reassign roles.
    #[error("user {actor} with role {role} may not reassign roles")]
    ActorNotAdmin {
        /// The acting user.
        actor: UserId,
        /// The acting user's role.
        role: Role,
    },

    /// An actor may never change their own role.
    #[error("user {0} cannot change their own role")]
    SelfRoleChange(UserId),

    /// An admin's role may not be reassigned.
    #[error("user {0} is an admin and their role cannot be changed")]
    AdminTarget(UserId),
}
