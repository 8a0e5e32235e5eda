//! In-memory holder of the current user list, loading flag and last error.
//!
//! `UserStore` is a cheap cloneable handle. The application creates one and
//! passes clones to the service (writer) and the UI (reader). Each setter
//! replaces one field under the write lock; readers take a whole snapshot.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::ApiError;
use crate::model::User;

/// Facade operation that produced a stored error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    FetchUsers,
    FetchUserById,
    CreateUser,
    UpdateUser,
    DeleteUser,
    DeleteAllUsers,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FetchUsers => "fetch users",
            Self::FetchUserById => "fetch user",
            Self::CreateUser => "create user",
            Self::UpdateUser => "update user",
            Self::DeleteUser => "delete user",
            Self::DeleteAllUsers => "delete all users",
        };
        f.write_str(s)
    }
}

/// Last failure recorded by the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreError {
    pub action: Action,
    pub error: ApiError,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to {}: {}", self.action, self.error)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserState {
    pub users: Vec<User>,
    pub loading: bool,
    pub error: Option<StoreError>,
}

#[derive(Clone, Debug, Default)]
pub struct UserStore {
    inner: Arc<RwLock<UserState>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> UserState {
        self.read().clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.read().users.clone()
    }

    pub fn loading(&self) -> bool {
        self.read().loading
    }

    pub fn error(&self) -> Option<StoreError> {
        self.read().error.clone()
    }

    pub fn set_users(&self, users: Vec<User>) {
        self.write().users = users;
    }

    pub fn set_loading(&self, loading: bool) {
        self.write().loading = loading;
    }

    pub fn set_error(&self, error: Option<StoreError>) {
        self.write().error = error;
    }

    // A panic while holding the lock leaves the state readable; keep going.
    fn read(&self) -> RwLockReadGuard<'_, UserState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Location;

    #[test]
    fn starts_empty() {
        let store = UserStore::new();
        let state = store.snapshot();
        assert!(state.users.is_empty());
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn clones_share_state() {
        let store = UserStore::new();
        let reader = store.clone();
        store.set_users(vec![User {
            id: "1".into(),
            name: "Ann".into(),
            email: "a@b.co".into(),
            birth_date: String::new(),
            location: Location::default(),
        }]);
        store.set_loading(true);
        store.set_error(Some(StoreError { action: Action::FetchUsers, error: ApiError::Transport("down".into()) }));

        let seen = reader.snapshot();
        assert_eq!(seen.users.len(), 1);
        assert!(seen.loading);
        assert_eq!(
            seen.error.map(|e| e.to_string()),
            Some("Failed to fetch users: network error: down".to_string())
        );
    }
}
