//! Data-fetching facade: turns UI actions into API calls plus store updates.
//!
//! Every operation runs inside a loading scope (flag set and error cleared on
//! entry, flag reset on every exit path), records failures in the store and
//! hands them back to the caller. Mutations never patch the cached list; they
//! re-fetch it from the backend once the call succeeds.

use tracing::{debug, info};

use crate::api::UserApi;
use crate::error::ApiResult;
use crate::model::{User, UserPayload};
use crate::store::{Action, StoreError, UserStore};

pub struct UserService<A> {
    api: A,
    store: UserStore,
}

impl<A: UserApi> UserService<A> {
    pub fn new(api: A, store: UserStore) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Replace the stored list with the backend's.
    pub fn fetch_users(&self) -> ApiResult<Vec<User>> {
        let _loading = LoadingGuard::acquire(&self.store);
        let users = self.record(Action::FetchUsers, self.api.list())?;
        debug!(count = users.len(), "fetched users");
        self.store.set_users(users.clone());
        Ok(users)
    }

    /// Read one record; the stored list is left alone.
    pub fn fetch_user_by_id(&self, id: &str) -> ApiResult<User> {
        let _loading = LoadingGuard::acquire(&self.store);
        self.record(Action::FetchUserById, self.api.get_by_id(id))
    }

    pub fn create_user(&self, payload: &UserPayload) -> ApiResult<User> {
        let _loading = LoadingGuard::acquire(&self.store);
        let created = self.record(Action::CreateUser, self.api.create(payload))?;
        info!(id = %created.id, "created user");
        self.fetch_users()?;
        Ok(created)
    }

    pub fn update_user(&self, id: &str, payload: &UserPayload) -> ApiResult<User> {
        let _loading = LoadingGuard::acquire(&self.store);
        let updated = self.record(Action::UpdateUser, self.api.update(id, payload))?;
        info!(id, "updated user");
        self.fetch_users()?;
        Ok(updated)
    }

    pub fn delete_user(&self, id: &str) -> ApiResult<()> {
        let _loading = LoadingGuard::acquire(&self.store);
        self.record(Action::DeleteUser, self.api.delete(id))?;
        info!(id, "deleted user");
        self.fetch_users()?;
        Ok(())
    }

    pub fn delete_all_users(&self) -> ApiResult<()> {
        let _loading = LoadingGuard::acquire(&self.store);
        self.record(Action::DeleteAllUsers, self.api.delete_all())?;
        info!("deleted all users");
        self.fetch_users()?;
        Ok(())
    }

    fn record<T>(&self, action: Action, result: ApiResult<T>) -> ApiResult<T> {
        result.map_err(|error| {
            self.store.set_error(Some(StoreError { action, error: error.clone() }));
            error
        })
    }
}

/// Holds `loading = true` for its lifetime.
struct LoadingGuard<'a> {
    store: &'a UserStore,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(store: &'a UserStore) -> Self {
        store.set_loading(true);
        store.set_error(None);
        Self { store }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.set_loading(false);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::model::Location;
    use std::sync::Mutex;

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub(crate) enum Call {
        List,
        Get(String),
        Create(UserPayload),
        Update(String, UserPayload),
        Delete(String),
        DeleteAll,
    }

    /// Records calls and serves canned results. `loading_seen` captures the
    /// store's loading flag at the moment of each call.
    pub(crate) struct MockApi {
        pub calls: Mutex<Vec<Call>>,
        pub users: Mutex<Vec<User>>,
        pub fail: Mutex<Option<ApiError>>,
        pub fail_list: Mutex<Option<ApiError>>,
        pub store: Option<UserStore>,
        pub loading_seen: Mutex<Vec<bool>>,
    }

    impl MockApi {
        pub(crate) fn new(users: Vec<User>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                users: Mutex::new(users),
                fail: Mutex::new(None),
                fail_list: Mutex::new(None),
                store: None,
                loading_seen: Mutex::new(Vec::new()),
            }
        }

        fn note(&self, call: Call) {
            if let Some(store) = &self.store {
                self.loading_seen.lock().unwrap().push(store.loading());
            }
            self.calls.lock().unwrap().push(call);
        }

        fn failure(&self) -> Option<ApiError> {
            self.fail.lock().unwrap().clone()
        }
    }

    impl UserApi for MockApi {
        fn list(&self) -> ApiResult<Vec<User>> {
            self.note(Call::List);
            if let Some(e) = self.fail_list.lock().unwrap().clone() {
                return Err(e);
            }
            Ok(self.users.lock().unwrap().clone())
        }

        fn get_by_id(&self, id: &str) -> ApiResult<User> {
            self.note(Call::Get(id.to_string()));
            if let Some(e) = self.failure() {
                return Err(e);
            }
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == id)
                .cloned()
                .ok_or(ApiError::Status { status: 404, message: "not found".into() })
        }

        fn create(&self, payload: &UserPayload) -> ApiResult<User> {
            self.note(Call::Create(payload.clone()));
            if let Some(e) = self.failure() {
                return Err(e);
            }
            let mut users = self.users.lock().unwrap();
            let created = User {
                id: format!("{}", users.len() + 1),
                name: payload.name.clone(),
                email: payload.email.clone(),
                birth_date: payload.birth_date.clone(),
                location: Location {
                    city: payload.city.clone(),
                    state: payload.state.clone(),
                    country: payload.country.clone(),
                },
            };
            users.push(created.clone());
            Ok(created)
        }

        fn update(&self, id: &str, payload: &UserPayload) -> ApiResult<User> {
            self.note(Call::Update(id.to_string(), payload.clone()));
            if let Some(e) = self.failure() {
                return Err(e);
            }
            let mut users = self.users.lock().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or(ApiError::Status { status: 404, message: "not found".into() })?;
            user.name = payload.name.clone();
            user.email = payload.email.clone();
            Ok(user.clone())
        }

        fn delete(&self, id: &str) -> ApiResult<serde_json::Value> {
            self.note(Call::Delete(id.to_string()));
            if let Some(e) = self.failure() {
                return Err(e);
            }
            self.users.lock().unwrap().retain(|u| u.id != id);
            Ok(serde_json::Value::Null)
        }

        fn delete_all(&self) -> ApiResult<serde_json::Value> {
            self.note(Call::DeleteAll);
            if let Some(e) = self.failure() {
                return Err(e);
            }
            self.users.lock().unwrap().clear();
            Ok(serde_json::json!({ "deleted": true }))
        }
    }

    pub(crate) fn user(id: &str, name: &str) -> User {
        User {
            id: id.into(),
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            birth_date: "2000-01-01T00:00:00Z".into(),
            location: Location { city: "X".into(), state: "Y".into(), country: "Z".into() },
        }
    }

    pub(crate) fn payload(name: &str) -> UserPayload {
        UserPayload {
            name: name.into(),
            email: "new@example.com".into(),
            birth_date: "1990-05-05".into(),
            city: "C".into(),
            state: "S".into(),
            country: "K".into(),
            password: Some("secret1".into()),
        }
    }

    fn service(users: Vec<User>) -> UserService<MockApi> {
        let store = UserStore::new();
        let mut api = MockApi::new(users);
        api.store = Some(store.clone());
        UserService::new(api, store)
    }

    fn calls(svc: &UserService<MockApi>) -> Vec<Call> {
        svc.api().calls.lock().unwrap().clone()
    }

    #[test]
    fn fetch_replaces_list_and_clears_loading() {
        let svc = service(vec![user("1", "Ann"), user("2", "Bob")]);
        let users = svc.fetch_users().unwrap();
        assert_eq!(users.len(), 2);
        let state = svc.store().snapshot();
        assert_eq!(state.users, users);
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(*svc.api().loading_seen.lock().unwrap(), vec![true]);
    }

    #[test]
    fn fetch_by_id_leaves_list_untouched() {
        let svc = service(vec![user("1", "Ann")]);
        let u = svc.fetch_user_by_id("1").unwrap();
        assert_eq!(u.name, "Ann");
        assert!(svc.store().users().is_empty());
        assert_eq!(calls(&svc), vec![Call::Get("1".into())]);
    }

    #[test]
    fn create_refetches_instead_of_inserting() {
        let svc = service(vec![user("1", "Ann")]);
        let created = svc.create_user(&payload("Cid")).unwrap();
        assert_eq!(created.id, "2");
        assert_eq!(calls(&svc), vec![Call::Create(payload("Cid")), Call::List]);
        let names: Vec<_> = svc.store().users().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["Ann", "Cid"]);
        assert!(!svc.store().loading());
    }

    #[test]
    fn update_refetches() {
        let svc = service(vec![user("1", "Ann")]);
        let mut body = payload("Anna");
        body.password = None;
        let updated = svc.update_user("1", &body).unwrap();
        assert_eq!(updated.name, "Anna");
        assert_eq!(calls(&svc), vec![Call::Update("1".into(), body), Call::List]);
        assert_eq!(svc.store().users()[0].name, "Anna");
    }

    #[test]
    fn delete_issues_one_delete_then_one_list() {
        let svc = service(vec![user("1", "Ann"), user("2", "Bob")]);
        svc.delete_user("1").unwrap();
        assert_eq!(calls(&svc), vec![Call::Delete("1".into()), Call::List]);
        assert_eq!(svc.store().users(), vec![user("2", "Bob")]);
    }

    #[test]
    fn delete_all_refetches_empty_list() {
        let svc = service(vec![user("1", "Ann")]);
        svc.fetch_users().unwrap();
        svc.delete_all_users().unwrap();
        assert_eq!(calls(&svc), vec![Call::List, Call::DeleteAll, Call::List]);
        assert!(svc.store().users().is_empty());
    }

    #[test]
    fn failed_create_surfaces_error_and_keeps_list() {
        let svc = service(vec![user("1", "Ann")]);
        svc.fetch_users().unwrap();
        let before = svc.store().users();

        let err = ApiError::Status { status: 500, message: "boom".into() };
        *svc.api().fail.lock().unwrap() = Some(err.clone());
        let res = svc.create_user(&payload("Cid"));

        assert_eq!(res, Err(err.clone()));
        let state = svc.store().snapshot();
        assert!(!state.loading);
        assert_eq!(state.users, before);
        assert_eq!(state.error, Some(StoreError { action: Action::CreateUser, error: err }));
        // No re-fetch after a failed mutation.
        assert_eq!(calls(&svc), vec![Call::List, Call::Create(payload("Cid"))]);
    }

    #[test]
    fn failed_refetch_after_mutation_is_a_fetch_error() {
        let svc = service(vec![user("1", "Ann")]);
        let err = ApiError::Transport("connection reset".into());
        *svc.api().fail_list.lock().unwrap() = Some(err.clone());

        let res = svc.delete_user("1");
        assert_eq!(res, Err(err.clone()));
        let state = svc.store().snapshot();
        assert!(!state.loading);
        assert_eq!(state.error.map(|e| e.action), Some(Action::FetchUsers));
    }

    #[test]
    fn new_call_clears_previous_error() {
        let svc = service(vec![user("1", "Ann")]);
        *svc.api().fail_list.lock().unwrap() = Some(ApiError::Timeout("slow".into()));
        assert!(svc.fetch_users().is_err());
        assert!(svc.store().error().is_some());

        *svc.api().fail_list.lock().unwrap() = None;
        svc.fetch_users().unwrap();
        assert!(svc.store().error().is_none());
    }
}
