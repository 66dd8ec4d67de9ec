//! In-memory repository for user accounts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::user::{
    domain::{EmailAddress, PersistedUserData, Role, User, UserId},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};

/// Thread-safe in-memory user repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<InMemoryUserState>>,
}

#[derive(Debug, Default)]
struct InMemoryUserState {
    users: HashMap<UserId, User>,
    email_index: HashMap<EmailAddress, UserId>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> UserRepositoryResult<RwLockReadGuard<'_, InMemoryUserState>> {
        self.state
            .read()
            .map_err(|err| UserRepositoryError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> UserRepositoryResult<RwLockWriteGuard<'_, InMemoryUserState>> {
        self.state
            .write()
            .map_err(|err| UserRepositoryError::persistence(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let mut state = self.write()?;
        if state.users.contains_key(&user.id()) {
            return Err(UserRepositoryError::DuplicateUser(user.id()));
        }
        if state.email_index.contains_key(user.email()) {
            return Err(UserRepositoryError::DuplicateEmail(user.email().clone()));
        }

        state.email_index.insert(user.email().clone(), user.id());
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn update_profile(&self, user: &User) -> UserRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .users
            .get(&user.id())
            .ok_or(UserRepositoryError::NotFound(user.id()))?;
        let old_email = stored.email().clone();
        let merged = User::from_persisted(PersistedUserData {
            id: stored.id(),
            name: user.name().clone(),
            email: user.email().clone(),
            role: stored.role(),
            created_at: stored.created_at(),
            updated_at: user.updated_at(),
        });

        let email_taken = state
            .email_index
            .get(user.email())
            .is_some_and(|owner| *owner != user.id());
        if email_taken {
            return Err(UserRepositoryError::DuplicateEmail(user.email().clone()));
        }

        state.email_index.remove(&old_email);
        state.email_index.insert(merged.email().clone(), merged.id());
        state.users.insert(merged.id(), merged);
        Ok(())
    }

    async fn update_role(
        &self,
        id: UserId,
        role: Role,
        updated_at: DateTime<Utc>,
    ) -> UserRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .users
            .get_mut(&id)
            .ok_or(UserRepositoryError::NotFound(id))?;
        *stored = User::from_persisted(PersistedUserData {
            id,
            name: stored.name().clone(),
            email: stored.email().clone(),
            role,
            created_at: stored.created_at(),
            updated_at,
        });
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        let state = self.read()?;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> UserRepositoryResult<Option<User>> {
        let state = self.read()?;
        let user = state
            .email_index
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned();
        Ok(user)
    }

    async fn list_all(&self) -> UserRepositoryResult<Vec<User>> {
        let state = self.read()?;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by_key(|user| (user.created_at(), user.id()));
        Ok(users)
    }
}
