//! Secrets list rendering, with expanded versions drawn as a tree.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding},
    Frame,
};

use crate::app::{App, Focus};
use crate::catalog::SecretEntry;

use super::colors;
use super::dialogs::BLOCK_CURSOR;
use super::empty::draw_empty_state;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Draws the list of secrets.
pub fn draw_secrets_list(frame: &mut Frame, area: Rect, app: &App) {
    let rows = app.catalog.visible_entries();

    if app.catalog.is_empty() {
        draw_empty_state(frame, area, "No secrets found", "Press F5 to refresh");
        return;
    }

    let selected = app.catalog.selected_index();
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let style = if selected == Some(idx) {
                Style::default()
                    .bg(colors::SELECTION)
                    .fg(colors::SELECTION_TEXT)
            } else {
                Style::default()
            };
            ListItem::new(row_line(entry, tree_prefix(&rows, idx), style)).style(style)
        })
        .collect();

    let border = if app.focus == Focus::List && app.modal.is_none() {
        colors::FOCUS_BORDER
    } else {
        colors::BORDER
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .border_set(symbols::border::ROUNDED)
                .title(title(app, rows.len()))
                .padding(Padding::horizontal(1)),
        )
        .highlight_symbol("");

    let mut state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn title(app: &App, shown: usize) -> Line<'static> {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(shown.to_string(), Style::default().fg(colors::SECONDARY).bold()),
        Span::styled(" secrets ", Style::default().fg(Color::White)),
    ];

    let query = app.catalog.filter_query();
    if app.catalog.is_filtering() {
        spans.push(Span::styled(format!("/{query}"), Style::default().fg(colors::KEY)));
        spans.push(Span::styled(BLOCK_CURSOR, Style::default().fg(colors::PRIMARY)));
        spans.push(Span::raw(" "));
    } else if app.catalog.is_filtered() {
        spans.push(Span::styled(
            format!("filter: {query} "),
            Style::default().fg(colors::MUTED),
        ));
    }
    Line::from(spans)
}

/// Tree glyph for row `idx`: empty for secrets, a branch for versions.
fn tree_prefix(rows: &[&SecretEntry], idx: usize) -> &'static str {
    if !rows[idx].is_version() {
        return "";
    }
    match rows.get(idx + 1) {
        Some(next) if next.is_version() => "├── ",
        _ => "└── ",
    }
}

fn row_line(entry: &SecretEntry, prefix: &'static str, style: Style) -> Line<'static> {
    let selected = style.bg.is_some();
    let muted = if selected {
        style
    } else {
        style.fg(colors::MUTED)
    };
    let created = entry.created_at.format(TIME_FORMAT).to_string();

    if !entry.is_version() {
        return Line::from(vec![
            Span::styled(entry.title.clone(), style.add_modifier(Modifier::BOLD)),
            Span::styled("  ", style),
            Span::styled(created, muted),
        ]);
    }

    let mut spans = vec![
        Span::styled(format!(" {prefix}"), style.fg(colors::TREE)),
        Span::styled(format!("v{:<4}", entry.version), style),
        Span::styled(created, muted),
    ];
    if let Some(state) = entry.state.as_deref().filter(|s| *s != "Enabled") {
        let color = if selected {
            colors::SELECTION_TEXT
        } else {
            colors::WARNING
        };
        spans.push(Span::styled(format!("  {state}"), style.fg(color)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::secret_store::{fake, VersionInfo};

    fn version(parent: &Arc<SecretEntry>, number: u64, state: &str) -> SecretEntry {
        SecretEntry::version_of(
            parent,
            &VersionInfo {
                version: number,
                state: state.to_string(),
                create_time: parent.created_at,
                full_path: parent.full_path.clone(),
            },
        )
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_tree_prefix_marks_last_version() {
        let parent = Arc::new(SecretEntry::current(&fake::info("alpha")));
        let v2 = version(&parent, 2, "Enabled");
        let v1 = version(&parent, 1, "Enabled");
        let beta = SecretEntry::current(&fake::info("beta"));
        let rows = vec![&*parent, &v2, &v1, &beta];

        assert_eq!(tree_prefix(&rows, 0), "");
        assert_eq!(tree_prefix(&rows, 1), "├── ");
        assert_eq!(tree_prefix(&rows, 2), "└── ");
        assert_eq!(tree_prefix(&rows, 3), "");
    }

    #[test]
    fn test_version_row_shows_non_enabled_state() {
        let parent = Arc::new(SecretEntry::current(&fake::info("alpha")));

        let disabled = row_line(&version(&parent, 3, "Disabled"), "└── ", Style::default());
        assert!(text(&disabled).contains("v3"));
        assert!(text(&disabled).ends_with("Disabled"));

        let enabled = row_line(&version(&parent, 2, "Enabled"), "├── ", Style::default());
        assert!(!text(&enabled).contains("Enabled"));
    }
}
