//! Add/edit user popup.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::AppState;
use crate::app::form::{FormField, FormFocus, UserForm};
use crate::ui::components::centered_rect;

/// Render the add/edit popup. Each field takes one line plus one for its error.
pub fn render_form_modal(f: &mut Frame, area: Rect, app: &AppState, form: &UserForm) {
    let fields = form.visible_fields();
    let height = (fields.len() as u16) * 2 + 5;
    let width = 60u16.min(area.width.saturating_sub(2)).max(30);
    let rect = centered_rect(width, height, area);

    let focus = form.focus();
    let mut lines: Vec<Line> = Vec::new();
    for field in fields {
        let focused = focus == FormFocus::Field(field);
        let marker = if focused { "▶ " } else { "  " };
        let label_style = if focused {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        let raw = form.value(field);
        let value = if raw.is_empty() {
            Span::styled(field.placeholder(), Style::default().fg(app.theme.muted).add_modifier(Modifier::ITALIC))
        } else if field == FormField::Password {
            Span::raw("*".repeat(raw.chars().count()))
        } else {
            Span::raw(raw.to_string())
        };
        let mut spans = vec![
            Span::raw(marker),
            Span::styled(format!("{:<11}", format!("{}:", field.label())), label_style),
            value,
        ];
        if focused && !form.is_submitting() {
            spans.push(Span::styled("_", Style::default().fg(app.theme.highlight_fg)));
        }
        lines.push(Line::from(spans));
        match form.error(field) {
            Some(err) => lines.push(Line::from(Span::styled(
                format!("    {err}"),
                Style::default().fg(app.theme.error),
            ))),
            None => lines.push(Line::raw("")),
        }
    }

    let button = |label: String, active: bool, enabled: bool| {
        let mut style = Style::default().fg(if enabled { app.theme.text } else { app.theme.muted });
        if active {
            style = style.fg(app.theme.highlight_fg).bg(app.theme.highlight_bg).add_modifier(Modifier::BOLD);
        }
        Span::styled(format!("[{label}]"), style)
    };
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::raw("  "),
        button("Cancel".to_string(), focus == FormFocus::Cancel, form.can_cancel()),
        Span::raw("   "),
        button(form.submit_label().to_string(), focus == FormFocus::Submit, !form.is_submitting()),
    ]));

    let p = Paragraph::new(lines).style(Style::default().fg(app.theme.text)).block(
        Block::default()
            .title(form.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
