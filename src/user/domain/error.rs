//! Error types for user domain validation and parsing.

use super::UserId;
use thiserror::Error;

/// Errors returned while constructing or mutating user domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserDomainError {
    /// The user name is empty after trimming.
    #[error("user name must not be empty")]
    EmptyName,

    /// The user name exceeds the storage limit.
    #[error("user name exceeds {max} characters (got {length})")]
    NameTooLong {
        /// Character count of the rejected name.
        length: usize,
        /// Maximum accepted character count.
        max: usize,
    },

    /// The email address is not of the form `local@domain.tld`.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// A validated role change was applied to a different user.
    #[error("role change for user {expected} applied to user {actual}")]
    RoleChangeTargetMismatch {
        /// User the role change was validated for.
        expected: UserId,
        /// User the role change was applied to.
        actual: UserId,
    },
}

/// Error returned while parsing roles from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
