//! User list screen: loading, error, empty and card-grid views.
//!
//! The grid publishes its column count and page size back into `AppState`
//! so keyboard navigation matches what is on screen.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::AppState;
use crate::model::{User, format_birth_date};
use crate::store::{Action, UserState};

const CARD_WIDTH: u16 = 36;
const CARD_HEIGHT: u16 = 8;
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Which screen the list area shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListView {
    Loading,
    /// A failed list fetch; carries the message to show.
    Error(String),
    Empty,
    Populated,
}

impl ListView {
    /// Loading wins over an error, which wins over the empty screen. Errors
    /// from other operations are reported as notices and keep the list visible.
    pub fn from_state(state: &UserState) -> Self {
        if state.loading {
            return Self::Loading;
        }
        if let Some(err) = &state.error
            && err.action == Action::FetchUsers
        {
            return Self::Error(err.to_string());
        }
        if state.users.is_empty() { Self::Empty } else { Self::Populated }
    }
}

pub fn render_users(f: &mut Frame, area: Rect, app: &mut AppState) {
    let state = app.store.snapshot();
    match ListView::from_state(&state) {
        ListView::Loading => render_loading(f, area, app),
        ListView::Error(message) => render_error(f, area, app, &message),
        ListView::Empty => render_empty(f, area, app),
        ListView::Populated => render_grid(f, area, app, &state.users),
    }
}

fn frame_block(app: &AppState, title: &'static str) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border))
}

/// Vertically center `lines` inside a bordered block.
fn render_centered(f: &mut Frame, area: Rect, app: &AppState, title: &'static str, lines: Vec<Line<'static>>) {
    let block = frame_block(app, title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let pad = inner.height.saturating_sub(lines.len() as u16) / 2;
    let rect = Rect { y: inner.y + pad, height: inner.height.saturating_sub(pad), ..inner };
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.text));
    f.render_widget(p, rect);
}

fn render_loading(f: &mut Frame, area: Rect, app: &AppState) {
    let tick = (app.started_at.elapsed().as_millis() / 100) as usize % SPINNER.len();
    let lines = vec![Line::from(vec![
        Span::styled(SPINNER[tick], Style::default().fg(app.theme.title)),
        Span::raw(" Loading users..."),
    ])];
    render_centered(f, area, app, "Users", lines);
}

fn render_error(f: &mut Frame, area: Rect, app: &AppState, message: &str) {
    let lines = vec![
        Line::from(Span::styled(
            "⚠️ Error",
            Style::default().fg(app.theme.error).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw(message.to_string()),
        Line::raw(""),
        Line::from(Span::styled("r: Retry", Style::default().fg(app.theme.highlight_fg))),
    ];
    render_centered(f, area, app, "Users", lines);
}

fn render_empty(f: &mut Frame, area: Rect, app: &AppState) {
    let lines = vec![
        Line::from(Span::styled(
            "No Users Found",
            Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw("There are no users in the system yet."),
        Line::raw(""),
        Line::from(Span::styled("r: Refresh   n: Add User", Style::default().fg(app.theme.highlight_fg))),
    ];
    render_centered(f, area, app, "Users", lines);
}

fn render_grid(f: &mut Frame, area: Rect, app: &mut AppState, users: &[User]) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(CARD_HEIGHT)].as_ref())
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled("Users List", Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {} users", users.len()), Style::default().fg(app.theme.muted)),
        Span::raw("    r: Refresh  n: Add User  D: Delete All"),
    ]))
    .style(Style::default().fg(app.theme.text))
    .block(frame_block(app, "Users"));
    f.render_widget(header, parts[0]);

    let grid = parts[1];
    let cols = (grid.width / CARD_WIDTH).max(1) as usize;
    let rows = (grid.height / CARD_HEIGHT).max(1) as usize;
    app.grid_columns = cols;
    app.page_size = cols * rows;

    let selected_row = app.selected_index / cols;
    let first_row = (selected_row / rows) * rows;
    let card_width = grid.width / cols as u16;

    for (offset, user) in users.iter().enumerate().skip(first_row * cols).take(cols * rows) {
        let slot = offset - first_row * cols;
        let rect = Rect {
            x: grid.x + (slot % cols) as u16 * card_width,
            y: grid.y + (slot / cols) as u16 * CARD_HEIGHT,
            width: card_width,
            height: CARD_HEIGHT.min(grid.height),
        };
        render_card(f, rect, app, user, offset == app.selected_index);
    }
}

fn render_card(f: &mut Frame, area: Rect, app: &AppState, user: &User, selected: bool) {
    let (border, title_style) = if selected {
        (
            Style::default().fg(app.theme.highlight_fg).bg(app.theme.highlight_bg),
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD),
        )
    } else {
        (
            Style::default().fg(app.theme.border),
            Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
        )
    };
    let label = |s: &'static str| Span::styled(s, Style::default().fg(app.theme.muted));
    let mut lines = vec![
        Line::from(vec![label("Email: "), Span::raw(user.email.clone())]),
        Line::from(vec![label("Location: "), Span::raw(user.location_line())]),
        Line::from(vec![label("Country: "), Span::raw(user.location.country.clone())]),
        Line::from(vec![label("Birth Date: "), Span::raw(format_birth_date(&user.birth_date))]),
        Line::from(vec![label("User ID: "), Span::raw(user.id.clone())]),
    ];
    if selected {
        lines.push(Line::from(Span::styled(
            "e: Edit  d: Delete",
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }
    let block = Block::default()
        .title(Span::styled(user.name.clone(), title_style))
        .borders(Borders::ALL)
        .border_style(border);
    let p = Paragraph::new(lines).style(Style::default().fg(app.theme.text)).block(block);
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::store::StoreError;

    fn failed(action: Action) -> Option<StoreError> {
        Some(StoreError { action, error: ApiError::Transport("refused".into()) })
    }

    #[test]
    fn loading_takes_precedence() {
        let state = UserState { users: vec![], loading: true, error: failed(Action::FetchUsers) };
        assert_eq!(ListView::from_state(&state), ListView::Loading);
    }

    #[test]
    fn only_fetch_failures_show_the_error_view() {
        let state = UserState { users: vec![], loading: false, error: failed(Action::FetchUsers) };
        assert_eq!(
            ListView::from_state(&state),
            ListView::Error("Failed to fetch users: network error: refused".into())
        );

        let state = UserState { users: vec![], loading: false, error: failed(Action::CreateUser) };
        assert_eq!(ListView::from_state(&state), ListView::Empty);
    }
}
