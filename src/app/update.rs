//! Event loop and state transitions.
//!
//! Key presses become [`Control`] values; backend work is handed to the
//! [`Worker`] and its [`Outcome`]s are folded back in by [`apply_outcome`].

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::api::HttpUserApi;
use crate::app::form::{FormFocus, UserForm};
use crate::app::keymap::{KeyAction, Keymap};
use crate::app::worker::{Outcome, Request, Worker};
use crate::app::{AppState, InputMode, ModalState, NoticeKind, Theme};
use crate::config::{Config, config_file_path};
use crate::error::ApiError;
use crate::model::UserFormData;
use crate::service::UserService;
use crate::store::{StoreError, UserStore};
use crate::ui;
use crate::ui::users::ListView;

/// What the loop should do after a key press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
    Dispatch(Request),
}

/// Build the HTTP client and worker, then run the UI until the user quits.
pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, config: Config) -> Result<()> {
    let api = HttpUserApi::new(config.clone()).context("failed to set up the API client")?;
    let store = UserStore::new();
    let worker = Worker::spawn(UserService::new(api, store.clone()));

    let mut app = AppState::new(store);
    app.theme = Theme::load_or_init(&config_file_path("theme.conf"));
    app.keymap = Keymap::load_or_init(&config_file_path("keybinds.conf"));
    app.environment = config.environment().as_str().to_string();
    app.api_url = config.base_url().to_string();

    run_loop(terminal, &mut app, &worker)
}

/// Event loop over an already assembled state and worker.
pub fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut AppState, worker: &Worker) -> Result<()> {
    // Show the spinner before the worker has picked up the first fetch.
    app.store.set_loading(true);
    dispatch(app, worker, Request::FetchUsers);

    loop {
        while let Some(outcome) = worker.try_recv() {
            apply_outcome(app, outcome);
        }
        app.expire_notice(Instant::now());

        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key(app, key) {
                    Control::Quit => break,
                    Control::Dispatch(request) => dispatch(app, worker, request),
                    Control::Continue => {}
                }
            }
        }
    }
    info!("quitting");
    Ok(())
}

/// Hand a request to the worker; a dead worker turns into a failed outcome.
pub fn dispatch(app: &mut AppState, worker: &Worker, request: Request) {
    debug!(?request, "dispatching");
    if !worker.submit(request.clone()) {
        warn!(?request, "worker unavailable");
        app.store.set_loading(false);
        app.store.set_error(Some(StoreError { action: request.action(), error: ApiError::WorkerUnavailable }));
        app.notify(NoticeKind::Failure, ApiError::WorkerUnavailable.to_string());
        apply_outcome(app, unavailable(request));
    }
}

fn unavailable(request: Request) -> Outcome {
    let err = ApiError::WorkerUnavailable;
    match request {
        Request::FetchUsers => Outcome::Fetched(Err(err)),
        Request::FetchUserById(_) => Outcome::Loaded(Err(err)),
        Request::Create(_) => Outcome::Created(Err(err)),
        Request::Update(..) => Outcome::Updated(Err(err)),
        Request::Delete(_) => Outcome::Deleted(Err(err)),
        Request::DeleteAll => Outcome::DeletedAll(Err(err)),
    }
}

pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Control {
    match app.input_mode {
        InputMode::Modal => handle_modal_key(app, key),
        InputMode::Normal => match app.keymap.resolve(&key) {
            Some(action) => handle_action(app, action),
            None => Control::Continue,
        },
    }
}

fn handle_action(app: &mut AppState, action: KeyAction) -> Control {
    let state = app.store.snapshot();
    let populated = ListView::from_state(&state) == ListView::Populated;
    let len = state.users.len();
    let selected = if populated { state.users.get(app.selected_index).cloned() } else { None };

    match action {
        KeyAction::Quit => return Control::Quit,
        KeyAction::Refresh => return Control::Dispatch(Request::FetchUsers),
        KeyAction::NewUser => {
            app.editing = None;
            app.open_modal(ModalState::Form(UserForm::new(None)));
        }
        KeyAction::EditSelection => {
            if let Some(user) = selected {
                app.editing = Some(user.id.clone());
                app.open_modal(ModalState::Form(UserForm::new(Some(UserFormData::from_user(&user)))));
            }
        }
        KeyAction::DeleteSelection => {
            if let Some(user) = selected {
                app.open_modal(ModalState::DeleteConfirm { id: user.id, name: user.name, selected: 1 });
            }
        }
        KeyAction::DeleteAll => {
            if populated {
                app.open_modal(ModalState::DeleteAllConfirm { selected: 1 });
            }
        }
        KeyAction::ViewDetails => {
            if let Some(user) = selected {
                return Control::Dispatch(Request::FetchUserById(user.id));
            }
        }
        KeyAction::OpenHelp => app.open_modal(ModalState::Help),
        KeyAction::MoveLeft => app.selected_index = app.selected_index.saturating_sub(1),
        KeyAction::MoveRight => {
            let target = app.selected_index.saturating_add(1);
            move_to(app, target, len);
        }
        KeyAction::MoveUp => {
            let cols = app.grid_columns.max(1);
            if app.selected_index >= cols {
                app.selected_index -= cols;
            }
        }
        KeyAction::MoveDown => {
            let target = app.selected_index.saturating_add(app.grid_columns.max(1));
            if target < len {
                app.selected_index = target;
            }
        }
        KeyAction::PageUp => app.selected_index = app.selected_index.saturating_sub(app.page_size.max(1)),
        KeyAction::PageDown => {
            let target = app.selected_index.saturating_add(app.page_size.max(1));
            move_to(app, target, len);
        }
        KeyAction::Ignore => {}
    }
    Control::Continue
}

fn move_to(app: &mut AppState, index: usize, len: usize) {
    app.selected_index = index.min(len.saturating_sub(1));
}

enum Step {
    Keep(ModalState),
    Close,
}

fn handle_modal_key(app: &mut AppState, key: KeyEvent) -> Control {
    let Some(modal) = app.modal.take() else {
        app.input_mode = InputMode::Normal;
        return Control::Continue;
    };

    let (step, control) = match modal {
        ModalState::Form(mut form) => {
            let control = form_key(&mut form, app.editing.as_deref(), key);
            match control {
                FormControl::Stay => (Step::Keep(ModalState::Form(form)), Control::Continue),
                FormControl::Cancel => (Step::Close, Control::Continue),
                FormControl::Submit(request) => (Step::Keep(ModalState::Form(form)), Control::Dispatch(request)),
            }
        }
        ModalState::DeleteConfirm { id, name, selected } => match confirm_key(selected, key.code) {
            Confirm::Pending(selected) => (Step::Keep(ModalState::DeleteConfirm { id, name, selected }), Control::Continue),
            Confirm::Yes => (Step::Close, Control::Dispatch(Request::Delete(id))),
            Confirm::No => (Step::Close, Control::Continue),
        },
        ModalState::DeleteAllConfirm { selected } => match confirm_key(selected, key.code) {
            Confirm::Pending(selected) => (Step::Keep(ModalState::DeleteAllConfirm { selected }), Control::Continue),
            Confirm::Yes => (Step::Close, Control::Dispatch(Request::DeleteAll)),
            Confirm::No => (Step::Close, Control::Continue),
        },
        other @ (ModalState::Details { .. } | ModalState::Info { .. } | ModalState::Help) => match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => (Step::Close, Control::Continue),
            _ => (Step::Keep(other), Control::Continue),
        },
    };

    match step {
        Step::Keep(modal) => app.modal = Some(modal),
        Step::Close => app.close_modal(),
    }
    control
}

enum FormControl {
    Stay,
    Cancel,
    Submit(Request),
}

fn form_key(form: &mut UserForm, editing: Option<&str>, key: KeyEvent) -> FormControl {
    match key.code {
        KeyCode::Esc => {
            if form.can_cancel() {
                return FormControl::Cancel;
            }
        }
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Enter => {
            if form.focus() == FormFocus::Cancel {
                if form.can_cancel() {
                    return FormControl::Cancel;
                }
                return FormControl::Stay;
            }
            match form.submit() {
                Ok(payload) => {
                    let request = match editing {
                        Some(id) => Request::Update(id.to_string(), payload),
                        None => Request::Create(payload),
                    };
                    return FormControl::Submit(request);
                }
                Err(errors) => debug!(count = errors.len(), "form rejected"),
            }
        }
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            form.input_char(c)
        }
        _ => {}
    }
    FormControl::Stay
}

enum Confirm {
    Pending(usize),
    Yes,
    No,
}

/// `selected`: 0 = Yes, 1 = No.
fn confirm_key(selected: usize, code: KeyCode) -> Confirm {
    match code {
        KeyCode::Esc | KeyCode::Char('n') => Confirm::No,
        KeyCode::Char('y') => Confirm::Yes,
        KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
            Confirm::Pending(if selected == 0 { 1 } else { 0 })
        }
        KeyCode::Enter => {
            if selected == 0 {
                Confirm::Yes
            } else {
                Confirm::No
            }
        }
        _ => Confirm::Pending(selected),
    }
}

/// Fold a finished request back into the UI state.
pub fn apply_outcome(app: &mut AppState, outcome: Outcome) {
    match outcome {
        Outcome::Fetched(Ok(users)) => {
            debug!(count = users.len(), "list refreshed");
            app.clamp_selection();
        }
        // The list view renders the stored error.
        Outcome::Fetched(Err(e)) => warn!(error = %e, "fetch users failed"),
        Outcome::Loaded(Ok(user)) => {
            if app.modal.is_none() {
                app.open_modal(ModalState::Details { user });
            }
        }
        Outcome::Loaded(Err(e)) => {
            let message = format!("Failed to fetch user: {e}");
            if app.modal.is_none() {
                app.open_modal(ModalState::Info { message });
            } else {
                app.notify(NoticeKind::Failure, message);
            }
        }
        Outcome::Created(result) => finish_form(app, result.map(|_| ()), "User created successfully!", "create user"),
        Outcome::Updated(result) => finish_form(app, result.map(|_| ()), "User updated successfully!", "update user"),
        Outcome::Deleted(Ok(())) => {
            app.clamp_selection();
            app.notify(NoticeKind::Success, "User deleted successfully!");
        }
        Outcome::Deleted(Err(e)) => app.notify(NoticeKind::Failure, format!("Failed to delete user: {e}")),
        Outcome::DeletedAll(Ok(())) => {
            app.selected_index = 0;
            app.notify(NoticeKind::Success, "All users deleted successfully!");
        }
        Outcome::DeletedAll(Err(e)) => app.notify(NoticeKind::Failure, format!("Failed to delete all users: {e}")),
    }
}

fn finish_form(app: &mut AppState, result: Result<(), ApiError>, success: &str, action: &str) {
    match result {
        Ok(()) => {
            if matches!(app.modal, Some(ModalState::Form(_))) {
                app.close_modal();
            }
            app.clamp_selection();
            app.notify(NoticeKind::Success, success);
        }
        Err(e) => {
            if let Some(ModalState::Form(form)) = app.modal.as_mut() {
                form.settle();
            }
            app.notify(NoticeKind::Failure, format!("Failed to {action}: {e}"));
        }
    }
}
