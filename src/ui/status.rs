//! Status bar and commands bar rendering.

use ratatui::{
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Focus};
use crate::modal::ActiveModal;

use super::colors;

/// Draws the commands bar showing the keys that do something right now.
pub fn draw_commands_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans: Vec<Span> = vec![Span::raw(" ")];

    for (i, (key, desc)) in commands(app).iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(colors::BORDER)));
        }
        spans.push(Span::styled(*key, Style::default().fg(colors::KEY).bold()));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(*desc, Style::default().fg(colors::MUTED)));
    }

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(colors::BORDER));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Returns the commands available in the app's current state.
fn commands(app: &App) -> Vec<(&'static str, &'static str)> {
    if let Some(modal) = &app.modal {
        return match modal {
            ActiveModal::Confirm(_) => vec![
                ("y/n", "answer"),
                ("←/→", "choose"),
                ("Enter", "confirm"),
                ("Esc", "cancel"),
            ],
            ActiveModal::ProjectSelector(_) => vec![
                ("Tab", "complete"),
                ("↑/↓", "suggestion"),
                ("Enter", "select"),
                ("Esc", "cancel"),
            ],
            ActiveModal::Search(_) => vec![("Enter", "search"), ("Esc", "cancel")],
            ActiveModal::Info(_) => vec![("Esc/Enter/q", "close")],
        };
    }

    if app.catalog.is_filtering() || app.detail_view.is_filtering() {
        return vec![("Enter", "apply"), ("Esc", "clear")];
    }

    if app.context.is_none() {
        return vec![("p", "project"), ("q", "quit")];
    }

    match app.focus {
        Focus::List => vec![
            ("j/k", "navigate"),
            ("e", "edit"),
            ("v", "versions"),
            ("r", "restore"),
            ("i", "info"),
            ("/", "filter"),
            ("^F", "search"),
            ("Tab", "detail"),
            ("p", "project"),
            ("q", "quit"),
        ],
        Focus::Detail => vec![
            ("j/k", "scroll"),
            ("/", "filter"),
            ("Enter", "next match"),
            ("Esc", "clear"),
            ("e", "edit"),
            ("Tab", "list"),
            ("q", "quit"),
        ],
    }
}

/// Draws the status bar at the bottom (for messages).
pub fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let (text, style) = match &app.status {
        Some(status) => {
            let color = if status.is_error {
                colors::ERROR
            } else {
                colors::SUCCESS
            };
            (format!(" {} ", status.text), Style::default().fg(color))
        }
        None if app.is_loading() => (" Loading...".to_string(), Style::default().fg(colors::WARNING)),
        None => (" Ready".to_string(), Style::default().fg(colors::MUTED)),
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}
