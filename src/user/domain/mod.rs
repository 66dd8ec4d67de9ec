//! Domain model for users, roles, and role reassignment.

mod error;
mod ids;
mod profile;
mod role;
mod role_change;
mod user;

pub use error::{ParseRoleError, UserDomainError};
pub use ids::UserId;
pub use profile::{EmailAddress, UserName};
pub use role::Role;
pub use role_change::{RoleChange, RoleChangeDenied, RoleChangeRequest};
pub use user::{PersistedUserData, User};
