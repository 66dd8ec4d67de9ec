//! Stable error classification shared by the task and user services.

use std::fmt;

/// Coarse category of a service failure.
///
/// Every service error exposes one of these kinds through a `kind()`
/// accessor. Hosts map kinds onto their own transport status codes; the
/// engine never performs that mapping itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An identifier did not resolve, or resolved outside the actor's
    /// visibility scope.
    NotFound,
    /// The request is well formed but violates an engine rule.
    InvalidOperation,
    /// The actor lacks the capability or role required by the request.
    PermissionDenied,
    /// Persistence or another infrastructure dependency failed.
    Internal,
}

impl ErrorKind {
    /// Returns a stable, machine-readable name for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidOperation => "invalid_operation",
            Self::PermissionDenied => "permission_denied",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
