//! Modal rendering (confirm, project selector, search form, secret info).

use chrono::Utc;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap},
    Frame,
};

use crate::constants::dialog;
use crate::modal::{
    format_age, ActiveModal, Confirm, ModalContinuation, ProjectSelector, SearchForm,
    SecretInfoDisplay,
};

use super::colors;
use super::utils::centered_rect;

/// Block cursor character for input fields.
pub(crate) const BLOCK_CURSOR: &str = "█";

/// Input field prompt indicator.
const INPUT_INDICATOR: &str = "› ";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Suggestions listed under the project input.
const MAX_SUGGESTIONS: usize = 6;

/// Draws the active modal on top of everything else.
pub fn draw_modal(frame: &mut Frame, modal: &ActiveModal) {
    match modal {
        ActiveModal::Confirm(confirm) => draw_confirm(frame, confirm),
        ActiveModal::ProjectSelector(selector) => draw_project_selector(frame, selector),
        ActiveModal::Search(form) => draw_search_form(frame, form),
        ActiveModal::Info(display) => draw_secret_info(frame, display),
    }
}

/// Clears `area` and returns the framed block for a dialog.
fn dialog_block(frame: &mut Frame, area: Rect, title: &str, accent: Color) -> Block<'static> {
    frame.render_widget(Clear, area);
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .border_set(symbols::border::DOUBLE)
        .title(Line::from(vec![
            Span::raw(" "),
            Span::styled(title.to_string(), Style::default().fg(Color::White).bold()),
            Span::raw(" "),
        ]))
        .padding(Padding::uniform(1))
}

fn input_line(value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {INPUT_INDICATOR}"),
            Style::default().fg(colors::MUTED),
        ),
        Span::styled(value.to_string(), Style::default().fg(Color::White)),
        Span::styled(
            BLOCK_CURSOR,
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::SLOW_BLINK),
        ),
    ])
}

fn hints(keys: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for (key, desc) in keys {
        spans.push(Span::styled(*key, Style::default().fg(colors::KEY).bold()));
        spans.push(Span::styled(format!(" {desc}  "), Style::default().fg(colors::MUTED)));
    }
    Line::from(spans)
}

fn draw_confirm(frame: &mut Frame, confirm: &Confirm) {
    let area = centered_rect(dialog::CONFIRM_WIDTH, dialog::CONFIRM_HEIGHT, frame.area());
    let title = match confirm.continuation() {
        ModalContinuation::EditCommit { .. } => "Create New Version",
        ModalContinuation::RestoreCommit(_) => "Restore Version",
    };
    let block = dialog_block(frame, area, title, colors::WARNING);

    let detail = match confirm.continuation() {
        ModalContinuation::EditCommit { title, .. } => format!("Secret: {title}"),
        ModalContinuation::RestoreCommit(request) => {
            format!("Secret: {}  version {}", request.title, request.version)
        }
    };

    let button = |label: &'static str, active: bool| {
        if active {
            Span::styled(
                format!(" {label} "),
                Style::default()
                    .bg(colors::SELECTION)
                    .fg(colors::SELECTION_TEXT)
                    .bold(),
            )
        } else {
            Span::styled(format!(" {label} "), Style::default().fg(colors::MUTED))
        }
    };

    let content = vec![
        Line::from(Span::styled(
            confirm.question().to_string(),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(detail, Style::default().fg(colors::MUTED))),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            button("Yes", confirm.choice()),
            Span::raw("   "),
            button("No", !confirm.choice()),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(content)
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}

fn draw_project_selector(frame: &mut Frame, selector: &ProjectSelector) {
    let area = centered_rect(
        dialog::PROJECT_SELECTOR_WIDTH,
        dialog::PROJECT_SELECTOR_HEIGHT,
        frame.area(),
    );
    let block = dialog_block(frame, area, "Select Project", colors::PRIMARY);

    let mut content = vec![
        Line::from(Span::styled("Project ID:", Style::default().fg(Color::White))),
        input_line(selector.input()),
    ];

    if let Some(error) = selector.error() {
        content.push(Line::from(Span::styled(
            format!("  {error}"),
            Style::default().fg(colors::ERROR),
        )));
    }
    if let Some(alert) = selector.alert() {
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            alert.to_string(),
            Style::default().fg(colors::ERROR).bold(),
        )));
    }

    let suggestions = selector.suggestions();
    if !suggestions.is_empty() {
        content.push(Line::from(""));
        for (idx, id) in suggestions.iter().take(MAX_SUGGESTIONS).enumerate() {
            let highlighted = idx == selector.highlighted();
            let style = if highlighted {
                Style::default()
                    .bg(colors::SELECTION)
                    .fg(colors::SELECTION_TEXT)
            } else {
                Style::default().fg(colors::MUTED)
            };
            content.push(Line::from(vec![
                Span::styled(
                    if highlighted { "  ▸ " } else { "    " },
                    Style::default().fg(colors::PRIMARY),
                ),
                Span::styled(id.to_string(), style),
            ]));
        }
    }

    content.push(Line::from(""));
    content.push(hints(&[("Tab", "complete"), ("Enter", "select"), ("Esc", "cancel")]));

    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn draw_search_form(frame: &mut Frame, form: &SearchForm) {
    let area = centered_rect(dialog::INPUT_WIDTH, dialog::INPUT_HEIGHT, frame.area());
    let block = dialog_block(frame, area, "Search Secret Values", colors::PRIMARY);

    let content = vec![
        Line::from(Span::styled(
            "Find secrets whose value contains:",
            Style::default().fg(Color::White),
        )),
        input_line(form.query()),
        Line::from(""),
        hints(&[("Enter", "search"), ("Esc", "cancel")]),
    ];

    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn draw_secret_info(frame: &mut Frame, display: &SecretInfoDisplay) {
    let area = centered_rect(dialog::INFO_WIDTH, dialog::INFO_HEIGHT, frame.area());
    let block = dialog_block(frame, area, &display.title(), colors::PRIMARY);

    let now = Utc::now();
    let info = display.info();
    let entry = display.entry();

    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(Color::White).bold()))
    };
    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {label:<12}"), Style::default().fg(Color::White)),
            Span::styled(value, Style::default().fg(colors::MUTED)),
        ])
    };

    let mut content = vec![
        heading("Secret Info:"),
        field("Name:", info.name.clone()),
        field("Full Path:", info.full_path.clone()),
        field("Created:", info.create_time.format(TIME_FORMAT).to_string()),
        field("Age:", format_age(info.create_time, now)),
    ];

    let sections = [
        ("Labels:", display.labels()),
        ("Annotations:", display.annotations()),
    ];
    for (label, pairs) in sections {
        if pairs.is_empty() {
            continue;
        }
        content.push(Line::from(""));
        content.push(heading(label));
        for (key, value) in pairs {
            content.push(Line::from(Span::styled(
                format!("    {key}: {value}"),
                Style::default().fg(colors::MUTED),
            )));
        }
    }

    content.extend([
        Line::from(""),
        heading("Selected Version Info:"),
        field("Version:", display.version_label()),
        field("Created:", entry.created_at.format(TIME_FORMAT).to_string()),
        field("Age:", format_age(entry.created_at, now)),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc to close",
            Style::default().fg(colors::MUTED).italic(),
        )),
    ]);

    frame.render_widget(
        Paragraph::new(content)
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::event::Action;
    use crate::modal::Modal;
    use crate::secret_store::fake;

    fn render(modal: &ActiveModal) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| draw_modal(frame, modal)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_cursor_is_visible() {
        assert_eq!(BLOCK_CURSOR, "█");
    }

    #[test]
    fn test_confirm_shows_question() {
        let modal = ActiveModal::Confirm(Confirm::new(
            "Do you want to restore this secret version?",
            ModalContinuation::EditCommit {
                title: "alpha".to_string(),
                payload: Vec::new(),
            },
        ));
        let screen = render(&modal);
        assert!(screen.contains("Do you want to restore this secret version?"));
        assert!(screen.contains("Secret: alpha"));
    }

    #[test]
    fn test_project_selector_shows_alert_and_suggestions() {
        let mut selector = ProjectSelector::new(vec!["prod-alpha".to_string()], false)
            .with_alert("Could not access project");
        selector.update(&Action::Char('p'));
        let screen = render(&ActiveModal::ProjectSelector(selector));
        assert!(screen.contains("Could not access project"));
        assert!(screen.contains("prod-alpha"));
    }

    #[test]
    fn test_secret_info_lists_labels() {
        let mut info = fake::info("alpha");
        info.labels.insert("team".to_string(), "core".to_string());
        let modal = ActiveModal::Info(SecretInfoDisplay::new(
            info,
            crate::catalog::SecretEntry::default(),
        ));
        let screen = render(&modal);
        assert!(screen.contains("Secret Information - Current Version"));
        assert!(screen.contains("team: core"));
        assert!(screen.contains("current"));
    }
}
