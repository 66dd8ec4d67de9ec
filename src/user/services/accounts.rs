//! Service layer for account registration, lookup, and role changes.

use crate::{
    error::ErrorKind,
    user::{
        domain::{
            EmailAddress, RoleChangeDenied, RoleChangeRequest, User, UserDomainError, UserId,
            UserName,
        },
        ports::{UserRepository, UserRepositoryError},
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for registering a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserRequest {
    name: String,
    email: String,
}

impl RegisterUserRequest {
    /// Creates a registration request.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Request payload for an actor editing their own profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProfileRequest {
    name: Option<String>,
    email: Option<String>,
}

impl UpdateProfileRequest {
    /// Creates an empty update that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets a new email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Service-level errors for account operations.
#[derive(Debug, Error)]
pub enum UserAccountError {
    /// The user does not exist.
    #[error("user not found: {0}")]
    NotFound(UserId),

    /// The actor may not view the requested account.
    #[error("user {actor} may not view user {target}")]
    ViewNotPermitted {
        /// The acting user.
        actor: UserId,
        /// The account the actor tried to view.
        target: UserId,
    },

    /// The actor may not list accounts.
    #[error("user {0} may not list users")]
    ListNotPermitted(UserId),

    /// The role change request was refused.
    #[error(transparent)]
    RoleChange(#[from] RoleChangeDenied),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] UserDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(UserRepositoryError),
}

impl UserAccountError {
    /// Returns the stable classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ViewNotPermitted { .. } | Self::ListNotPermitted(_) | Self::RoleChange(_) => {
                ErrorKind::PermissionDenied
            }
            Self::Domain(_) | Self::Repository(UserRepositoryError::DuplicateEmail(_)) => {
                ErrorKind::InvalidOperation
            }
            Self::Repository(_) => ErrorKind::Internal,
        }
    }
}

impl From<UserRepositoryError> for UserAccountError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::NotFound(id) => Self::NotFound(id),
            other => Self::Repository(other),
        }
    }
}

/// Result type for account service operations.
pub type UserAccountResult<T> = Result<T, UserAccountError>;

/// Account orchestration service.
pub struct UserAccountService<R, C>
where
    R: UserRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for UserAccountService<R, C>
where
    R: UserRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> UserAccountService<R, C>
where
    R: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new account service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Registers a new account with the plain user role.
    ///
    /// # Errors
    ///
    /// Returns [`UserAccountError::Domain`] when the name or email is invalid
    /// and [`UserAccountError::Repository`] when the email is already taken
    /// or persistence fails.
    #[tracing::instrument(skip_all)]
    pub async fn register(&self, request: RegisterUserRequest) -> UserAccountResult<User> {
        let RegisterUserRequest { name, email } = request;
        let user = User::register(UserName::new(name)?, EmailAddress::new(email)?, &*self.clock);
        self.repository.store(&user).await?;
        info!(user_id = %user.id(), "registered user");
        Ok(user)
    }

    /// Returns an account visible to the actor.
    ///
    /// Privileged actors may view any account; everyone else only their
    /// own.
    ///
    /// # Errors
    ///
    /// Returns [`UserAccountError::ViewNotPermitted`] when the actor may not
    /// view other accounts and [`UserAccountError::NotFound`] when the user
    /// does not exist.
    #[tracing::instrument(skip_all, fields(actor_id = %actor.id(), user_id = %id))]
    pub async fn find_user(&self, actor: &User, id: UserId) -> UserAccountResult<User> {
        if actor.id() != id && !actor.role().is_privileged() {
            debug!("account lookup refused");
            return Err(UserAccountError::ViewNotPermitted {
                actor: actor.id(),
                target: id,
            });
        }
        self.find_or_error(id).await
    }

    /// Lists every account.
    ///
    /// # Errors
    ///
    /// Returns [`UserAccountError::ListNotPermitted`] for non-privileged
    /// actors.
    #[tracing::instrument(skip_all, fields(actor_id = %actor.id()))]
    pub async fn list_users(&self, actor: &User) -> UserAccountResult<Vec<User>> {
        if !actor.role().is_privileged() {
            return Err(UserAccountError::ListNotPermitted(actor.id()));
        }
        Ok(self.repository.list_all().await?)
    }

    /// Applies profile edits to the actor's own account.
    ///
    /// # Errors
    ///
    /// Returns [`UserAccountError::Domain`] when a supplied field is invalid
    /// and [`UserAccountError::Repository`] when the email is taken or
    /// persistence fails.
    #[tracing::instrument(skip_all, fields(actor_id = %actor.id()))]
    pub async fn update_profile(
        &self,
        actor: &User,
        request: UpdateProfileRequest,
    ) -> UserAccountResult<User> {
        let UpdateProfileRequest { name, email } = request;
        let validated_name = name.map(UserName::new).transpose()?;
        let validated_email = email.map(EmailAddress::new).transpose()?;

        let mut user = self.find_or_error(actor.id()).await?;
        if let Some(new_name) = validated_name {
            user.rename(new_name, &*self.clock);
        }
        if let Some(new_email) = validated_email {
            user.change_email(new_email, &*self.clock);
        }
        self.repository.update_profile(&user).await?;
        info!("updated user profile");
        Ok(user)
    }

    /// Reassigns the role of another account.
    ///
    /// # Errors
    ///
    /// Returns [`UserAccountError::RoleChange`] when the actor is not an
    /// admin (checked before the target is looked up), targets themself, or
    /// targets an admin, and [`UserAccountError::NotFound`] when an admin
    /// names an unknown target.
    #[tracing::instrument(
        skip_all,
        fields(actor_id = %actor.id(), target_id = %request.target(), role = %request.role())
    )]
    pub async fn change_role(
        &self,
        actor: &User,
        request: RoleChangeRequest,
    ) -> UserAccountResult<User> {
        RoleChangeRequest::authorize_actor(actor)
            .inspect_err(|denied| debug!(reason = %denied, "role change refused"))?;
        let mut target = self.find_or_error(request.target()).await?;
        let change = request
            .validate(actor, &target)
            .inspect_err(|denied| debug!(reason = %denied, "role change refused"))?;

        target.apply_role_change(change, &*self.clock)?;
        self.repository
            .update_role(target.id(), target.role(), target.updated_at())
            .await?;
        info!(from = %change.from(), to = %change.to(), "role changed");
        Ok(target)
    }

    async fn find_or_error(&self, id: UserId) -> UserAccountResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserAccountError::NotFound(id))
    }
}
