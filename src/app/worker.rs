//! Background worker that owns the [`UserService`] and runs its operations
//! one at a time, so the UI thread never blocks on the network.
//!
//! Requests are queued on a channel and executed in submission order. Two
//! overlapping actions therefore never interleave: the later one starts only
//! after the earlier one (including its re-fetch) has finished.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::UserApi;
use crate::error::ApiResult;
use crate::model::{User, UserPayload};
use crate::service::UserService;
use crate::store::Action;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    FetchUsers,
    FetchUserById(String),
    Create(UserPayload),
    Update(String, UserPayload),
    Delete(String),
    DeleteAll,
}

impl Request {
    /// Service operation this request runs, used to tag store errors.
    pub fn action(&self) -> Action {
        match self {
            Self::FetchUsers => Action::FetchUsers,
            Self::FetchUserById(_) => Action::FetchUserById,
            Self::Create(_) => Action::CreateUser,
            Self::Update(..) => Action::UpdateUser,
            Self::Delete(_) => Action::DeleteUser,
            Self::DeleteAll => Action::DeleteAllUsers,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Fetched(ApiResult<Vec<User>>),
    Loaded(ApiResult<User>),
    Created(ApiResult<User>),
    Updated(ApiResult<User>),
    Deleted(ApiResult<()>),
    DeletedAll(ApiResult<()>),
}

pub struct Worker {
    requests: Sender<Request>,
    outcomes: Receiver<Outcome>,
}

impl Worker {
    pub fn spawn<A: UserApi + 'static>(service: UserService<A>) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<Request>();
        let (out_tx, out_rx) = mpsc::channel::<Outcome>();
        thread::Builder::new()
            .name("user-admin-worker".into())
            .spawn(move || {
                for request in req_rx {
                    debug!(?request, "worker executing");
                    let outcome = execute(&service, request);
                    if out_tx.send(outcome).is_err() {
                        break;
                    }
                }
                debug!("worker stopped");
            })
            .map_err(|e| warn!(error = %e, "failed to spawn worker thread"))
            .ok();
        Self { requests: req_tx, outcomes: out_rx }
    }

    /// Worker whose thread has already gone away; every submit fails.
    #[cfg(test)]
    pub(crate) fn disconnected() -> Self {
        let (requests, _) = mpsc::channel();
        let (_, outcomes) = mpsc::channel();
        Self { requests, outcomes }
    }

    /// Queue a request. Returns false when the worker is gone.
    pub fn submit(&self, request: Request) -> bool {
        self.requests.send(request).is_ok()
    }

    pub fn try_recv(&self) -> Option<Outcome> {
        self.outcomes.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Outcome> {
        match self.outcomes.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

fn execute<A: UserApi>(service: &UserService<A>, request: Request) -> Outcome {
    match request {
        Request::FetchUsers => Outcome::Fetched(service.fetch_users()),
        Request::FetchUserById(id) => Outcome::Loaded(service.fetch_user_by_id(&id)),
        Request::Create(payload) => Outcome::Created(service.create_user(&payload)),
        Request::Update(id, payload) => Outcome::Updated(service.update_user(&id, &payload)),
        Request::Delete(id) => Outcome::Deleted(service.delete_user(&id)),
        Request::DeleteAll => Outcome::DeletedAll(service.delete_all_users()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::{Call, MockApi, user};
    use crate::store::UserStore;

    #[test]
    fn runs_requests_in_submission_order() {
        let store = UserStore::new();
        let worker = Worker::spawn(UserService::new(MockApi::new(vec![user("1", "Ann")]), store.clone()));

        assert!(worker.submit(Request::FetchUsers));
        assert!(worker.submit(Request::Delete("1".into())));
        assert!(worker.submit(Request::FetchUserById("1".into())));

        let t = Duration::from_secs(5);
        assert!(matches!(worker.recv_timeout(t), Some(Outcome::Fetched(Ok(users))) if users.len() == 1));
        assert_eq!(worker.recv_timeout(t), Some(Outcome::Deleted(Ok(()))));
        assert!(matches!(worker.recv_timeout(t), Some(Outcome::Loaded(Err(_)))));
        assert!(store.users().is_empty());
        assert!(!store.loading());
    }

    #[test]
    fn execute_maps_each_request() {
        let svc = UserService::new(MockApi::new(vec![]), UserStore::new());
        assert_eq!(execute(&svc, Request::DeleteAll), Outcome::DeletedAll(Ok(())));
        assert_eq!(
            *svc.api().calls.lock().unwrap(),
            vec![Call::DeleteAll, Call::List]
        );
    }

    #[test]
    fn disconnected_worker_rejects_requests() {
        let worker = Worker::disconnected();
        assert!(!worker.submit(Request::FetchUsers));
        assert_eq!(worker.try_recv(), None);
        assert_eq!(Request::Update("1".into(), crate::service::tests::payload("Ann")).action(), Action::UpdateUser);
    }
}
