// Unit tests for user-admin
// These tests work with the public API without touching the network

use std::sync::Mutex;

use serde_json::Value;
use user_admin::error::{ApiError, ApiResult};
use user_admin::model::{Location, User, UserPayload};
use user_admin::UserApi;

/// In-memory backend that records each call in order.
#[derive(Default)]
struct RecordingApi {
    users: Mutex<Vec<User>>,
    calls: Mutex<Vec<String>>,
    fail_create: bool,
}

impl RecordingApi {
    fn with(users: Vec<User>) -> Self {
        Self { users: Mutex::new(users), ..Default::default() }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl UserApi for RecordingApi {
    fn list(&self) -> ApiResult<Vec<User>> {
        self.log("list");
        Ok(self.users.lock().unwrap().clone())
    }

    fn get_by_id(&self, id: &str) -> ApiResult<User> {
        self.log(format!("get {id}"));
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(ApiError::Status { status: 404, message: "User not found".into() })
    }

    fn create(&self, payload: &UserPayload) -> ApiResult<User> {
        self.log(format!("create {}", payload.name));
        if self.fail_create {
            return Err(ApiError::Status { status: 500, message: "db down".into() });
        }
        let mut users = self.users.lock().unwrap();
        let user = User {
            id: (users.len() + 1).to_string(),
            name: payload.name.clone(),
            email: payload.email.clone(),
            birth_date: payload.birth_date.clone(),
            location: Location {
                city: payload.city.clone(),
                state: payload.state.clone(),
                country: payload.country.clone(),
            },
        };
        users.push(user.clone());
        Ok(user)
    }

    fn update(&self, id: &str, payload: &UserPayload) -> ApiResult<User> {
        self.log(format!("update {id}"));
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(ApiError::Status { status: 404, message: "User not found".into() })?;
        user.name = payload.name.clone();
        Ok(user.clone())
    }

    fn delete(&self, id: &str) -> ApiResult<Value> {
        self.log(format!("delete {id}"));
        self.users.lock().unwrap().retain(|u| u.id != id);
        Ok(Value::Null)
    }

    fn delete_all(&self) -> ApiResult<Value> {
        self.log("delete_all");
        self.users.lock().unwrap().clear();
        Ok(Value::Null)
    }
}

fn ann() -> User {
    User {
        id: "1".into(),
        name: "Ann".into(),
        email: "a@b.co".into(),
        birth_date: "2000-01-01T00:00:00Z".into(),
        location: Location { city: "X".into(), state: "Y".into(), country: "Z".into() },
    }
}

#[cfg(test)]
mod model_tests {
    use super::*;
    use user_admin::model::{UserFormData, format_birth_date};

    #[test]
    fn decodes_backend_list() {
        let body = r#"[{"id":"1","name":"Ann","email":"a@b.co","birthDate":"2000-01-01T00:00:00Z","location":{"city":"X","state":"Y","country":"Z"}}]"#;
        let users: Vec<User> = serde_json::from_str(body).unwrap();
        assert_eq!(users, vec![ann()]);
        assert_eq!(users[0].location_line(), "X, Y");
        assert_eq!(format_birth_date(&users[0].birth_date), "1/1/2000");
    }

    #[test]
    fn update_payload_never_carries_password() {
        let mut data = UserFormData::from_user(&ann());
        data.password = "ignored".into();
        let json = serde_json::to_value(data.to_payload(false)).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("id").is_none());
        assert_eq!(json["birthDate"], "2000-01-01");
    }
}

#[cfg(test)]
mod service_tests {
    use super::*;
    use user_admin::store::Action;
    use user_admin::{UserService, UserStore};

    #[test]
    fn each_mutation_refetches_once() {
        let service = UserService::new(RecordingApi::with(vec![ann()]), UserStore::new());
        service.delete_user("1").unwrap();
        assert_eq!(service.api().calls(), vec!["delete 1", "list"]);
        assert!(service.store().users().is_empty());
    }

    #[test]
    fn failed_create_leaves_list_alone() {
        let api = RecordingApi { fail_create: true, ..RecordingApi::with(vec![ann()]) };
        let store = UserStore::new();
        let service = UserService::new(api, store.clone());
        service.fetch_users().unwrap();

        let payload = UserPayload {
            name: "Bob".into(),
            email: "b@c.de".into(),
            birth_date: "1999-09-09".into(),
            city: "A".into(),
            state: "B".into(),
            country: "C".into(),
            password: Some("secret1".into()),
        };
        let err = service.create_user(&payload).unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(!store.loading());
        assert_eq!(store.users(), vec![ann()]);
        assert_eq!(store.error().map(|e| e.action), Some(Action::CreateUser));
        assert_eq!(service.api().calls(), vec!["list", "create Bob"]);
    }

    #[test]
    fn fetch_by_id_does_not_touch_the_list() {
        let store = UserStore::new();
        let service = UserService::new(RecordingApi::with(vec![ann()]), store.clone());
        assert_eq!(service.fetch_user_by_id("1").unwrap(), ann());
        assert!(store.users().is_empty());
        assert!(service.fetch_user_by_id("9").is_err());
    }
}

#[cfg(test)]
mod form_tests {
    use user_admin::app::form::{FormField, UserForm};

    #[test]
    fn bad_email_is_rejected_before_submit() {
        let mut form = UserForm::new(None);
        form.set_field(FormField::Name, "Ann");
        form.set_field(FormField::Email, "bad-email");
        form.set_field(FormField::BirthDate, "2000-01-01");
        form.set_field(FormField::City, "X");
        form.set_field(FormField::State, "Y");
        form.set_field(FormField::Country, "Z");
        form.set_field(FormField::Password, "secret1");

        let errors = form.submit().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(form.error(FormField::Email), Some("Email is invalid"));
        assert!(!form.is_submitting());

        form.set_field(FormField::Email, "a@b.co");
        assert!(form.error(FormField::Email).is_none());
        assert!(form.submit().is_ok());
        assert_eq!(form.submit_label(), "Saving...");
    }
}

#[cfg(test)]
mod config_file_tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use user_admin::app::Theme;
    use user_admin::app::keymap::{KeyAction, Keymap};

    #[test]
    fn keymap_file_adds_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keybinds.conf");
        std::fs::write(&path, "# custom\nQuit = Ctrl+q\nNewUser = F2\nbogus line\n").unwrap();

        let km = Keymap::load_or_init(&path);
        let ctrl_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(km.resolve(&ctrl_q), Some(KeyAction::Quit));
        assert_eq!(km.resolve(&KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE)), Some(KeyAction::NewUser));
        // Defaults survive.
        assert_eq!(km.resolve(&KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE)), Some(KeyAction::NewUser));
    }

    #[test]
    fn theme_is_written_on_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("theme.conf");
        let t = Theme::load_or_init(&path);
        assert!(path.exists());
        let t2 = Theme::from_file(&path).unwrap();
        assert_eq!(t.title, t2.title);
        assert_eq!(t.error, t2.error);
    }
}
