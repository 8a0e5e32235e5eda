//! Rendering entry point.
//!
//! Lays out header, list area and status bar, then draws the open popup on top.

pub mod components;
pub mod form;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, ModalState};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());

    let p = Paragraph::new(format!(
        "User Management System  [{}]  ?: help; q: quit",
        app.environment
    ))
    .block(
        Block::default()
            .title("user-admin")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, root[0]);

    users::render_users(f, root[1], app);
    components::render_status_bar(f, root[2], app);

    if app.modal.is_some() {
        render_modal(f, f.area(), app);
    }
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(state) = app.modal.as_ref() else { return };
    match state {
        ModalState::Form(form) => form::render_form_modal(f, area, app, form),
        ModalState::DeleteConfirm { name, selected, .. } => components::render_confirm_modal(
            f,
            area,
            app,
            &format!("Delete {name}"),
            "Are you sure you want to delete this user?",
            *selected,
        ),
        ModalState::DeleteAllConfirm { selected } => components::render_confirm_modal(
            f,
            area,
            app,
            "Delete all users",
            "Are you sure you want to delete ALL users? This cannot be undone.",
            *selected,
        ),
        ModalState::Details { user } => components::render_details_modal(f, area, app, user),
        ModalState::Info { message } => components::render_info_modal(f, area, app, message),
        ModalState::Help => components::render_help_modal(f, area, app),
    }
}
