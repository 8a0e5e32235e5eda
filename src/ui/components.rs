//! Shared UI components (status bar, popups, layout helpers).
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, NoticeKind};
use crate::model::{User, format_birth_date};

/// Render the bottom status bar: mode, count, environment, URL and the current notice.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Modal => "MODAL",
    };
    let base = Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg);
    let mut spans = vec![Span::raw(format!(
        "mode: {mode}  users:{}  env:{}  api:{}",
        app.store.users().len(),
        app.environment,
        app.api_url
    ))];
    if let Some(notice) = &app.notice {
        let color = match notice.kind {
            NoticeKind::Success => app.theme.success,
            NoticeKind::Failure => app.theme.error,
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            notice.message.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).style(base), area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render a generic informational modal dialog.
pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, message: &str) {
    let max_w = area.width.saturating_sub(6).max(30);
    let min_w = 48u16.min(max_w);
    let approx_lines = (message.len() as u16 / (min_w.saturating_sub(4).max(10))).max(1);
    let max_h = area.height.saturating_sub(6).max(5);
    let height = (approx_lines + 4).min(max_h).max(5);
    let rect = centered_rect(min_w, height, area);
    let p = Paragraph::new(message.to_string())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Info")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Full record as returned by the single-user endpoint.
pub fn render_details_modal(f: &mut Frame, area: Rect, app: &AppState, user: &User) {
    let rect = centered_rect(56u16.min(area.width), 11, area);
    let label = |s: &'static str| Span::styled(s, Style::default().fg(app.theme.muted));
    let lines = vec![
        Line::from(Span::styled(
            user.name.clone(),
            Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(vec![label("Email: "), Span::raw(user.email.clone())]),
        Line::from(vec![label("Location: "), Span::raw(user.location_line())]),
        Line::from(vec![label("Country: "), Span::raw(user.location.country.clone())]),
        Line::from(vec![label("Birth Date: "), Span::raw(format_birth_date(&user.birth_date))]),
        Line::from(vec![label("User ID: "), Span::raw(user.id.clone())]),
        Line::raw(""),
        Line::from(Span::styled("Esc / Enter to close", Style::default().add_modifier(Modifier::ITALIC))),
    ];
    let p = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title("User Details")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Yes/No confirmation; `selected` 0 = Yes, 1 = No.
pub fn render_confirm_modal(f: &mut Frame, area: Rect, app: &AppState, title: &str, question: &str, selected: usize) {
    let rect = centered_rect(52u16.min(area.width), 7, area);
    let button = |label: &'static str, active: bool| {
        let style = if active {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Span::styled(label, style)
    };
    let lines = vec![
        Line::raw(question.to_string()),
        Line::raw(""),
        Line::from(vec![
            Span::raw("   "),
            button("[Yes]", selected == 0),
            Span::raw("   "),
            button("[No]", selected != 0),
        ]),
    ];
    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.error)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Render the help modal listing the active key bindings.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let width = 64u16.min(area.width.saturating_sub(4)).max(40);
    let height = 24u16.min(area.height.saturating_sub(2)).max(10);
    let rect = centered_rect(width, height, area);

    let keys = |action: KeyAction| app.keymap.keys_for(action).join(", ");
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::raw(format!("{label}: ")),
            Span::styled(value, Style::default().add_modifier(Modifier::ITALIC)),
        ])
    };

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled("Users", Style::default().add_modifier(Modifier::BOLD))),
        Line::raw(""),
    ];
    for (label, action) in [
        ("Refresh / retry", KeyAction::Refresh),
        ("Add user", KeyAction::NewUser),
        ("Edit selected", KeyAction::EditSelection),
        ("Delete selected", KeyAction::DeleteSelection),
        ("Delete all", KeyAction::DeleteAll),
        ("View details", KeyAction::ViewDetails),
        ("Help", KeyAction::OpenHelp),
        ("Quit", KeyAction::Quit),
    ] {
        lines.push(row(label, keys(action)));
    }
    lines.push(row(
        "Navigation",
        format!(
            "{} / {} / {} / {}",
            keys(KeyAction::MoveUp),
            keys(KeyAction::MoveDown),
            keys(KeyAction::MoveLeft),
            keys(KeyAction::MoveRight)
        ),
    ));
    lines.push(row("Page", format!("{} / {}", keys(KeyAction::PageUp), keys(KeyAction::PageDown))));
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Form", Style::default().add_modifier(Modifier::BOLD))));
    lines.push(row("Next / previous field", "Tab, Down / Shift+Tab, Up".to_string()));
    lines.push(row("Submit (or press focused button)", "Enter".to_string()));
    lines.push(row("Cancel", "Esc".to_string()));
    lines.push(Line::raw(""));
    lines.push(row("Confirm popups", "y / n, Left/Right + Enter".to_string()));
    lines.push(row("Close help", "Esc / Enter".to_string()));

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
