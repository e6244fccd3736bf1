//! Header rendering: logo, active project and catalog summary.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

use super::colors;

const LOGO: [&str; 3] = [" ▄▀▀▀ ▄▀▀▀ █▄ ▄█ ", " █ ▀█ ▀▀▀▄ █ ▀ █ ", "  ▀▀▀ ▀▀▀  ▀   ▀ "];

/// Draws the header.
pub fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let border = Style::default().fg(colors::BORDER);
    let logo = Style::default().fg(colors::PRIMARY).bold();
    let label = Style::default().fg(colors::MUTED);

    let badge = if app.is_loading() {
        Span::styled(
            " ◈ LOADING ",
            Style::default()
                .fg(colors::WARNING)
                .add_modifier(Modifier::SLOW_BLINK),
        )
    } else {
        Span::styled(" ◈ Google Cloud ", Style::default().fg(colors::SUCCESS).bold())
    };

    let project = match app.project_id() {
        Some(id) => Span::styled(id.to_string(), Style::default().fg(colors::SECONDARY).bold()),
        None => Span::styled("none", Style::default().fg(colors::WARNING)),
    };

    let mut counters = Vec::new();
    for (i, (name, value)) in summary(app).into_iter().enumerate() {
        if i > 0 {
            counters.push(Span::styled("  ", label));
        }
        counters.push(Span::styled(format!("{name} "), label));
        counters.push(Span::styled(value, Style::default().fg(colors::ACCENT)));
    }

    let lines = vec![
        Line::from(vec![
            Span::styled("╭──────────────────╮", border),
            badge,
            Span::styled("─".repeat(24), border),
        ]),
        Line::from(vec![
            Span::styled("│", border),
            Span::styled(LOGO[0], logo),
            Span::styled(" │ ", border),
            Span::styled("SECRET", Style::default().fg(colors::PRIMARY).bold()),
            Span::styled("::", label),
            Span::styled("EDITOR", Style::default().fg(colors::KEY).bold()),
            Span::styled(format!("  v{}", env!("CARGO_PKG_VERSION")), label),
        ]),
        Line::from(vec![
            Span::styled("│", border),
            Span::styled(LOGO[1], logo),
            Span::styled(" │ ", border),
            Span::styled("⬢ project ", label),
            project,
        ]),
        Line::from(vec![
            Span::styled("│", border),
            Span::styled(LOGO[2], logo),
            Span::styled(" │ ", border),
        ]
        .into_iter()
        .chain(counters)
        .collect::<Vec<_>>()),
        Line::from(Span::styled("╰──────────────────╯", border)),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

/// Counters shown next to the logo.
fn summary(app: &App) -> Vec<(&'static str, String)> {
    let entries = app.catalog.entries();
    let versions = entries.iter().filter(|e| e.is_version()).count();
    let mut items = vec![
        ("secrets", (entries.len() - versions).to_string()),
        ("versions", versions.to_string()),
    ];
    if !app.search_query.is_empty() {
        items.push(("search", format!("\"{}\"", app.search_query)));
    }
    items
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::unbounded_channel;

    use super::*;
    use crate::secret_store::fake;

    #[test]
    fn test_summary_counts_rows() {
        let (tx, _rx) = unbounded_channel();
        let mut app = App::new(Vec::new(), std::env::temp_dir(), tx);
        app.catalog
            .populate_from(&[fake::info("alpha"), fake::info("beta")]);
        app.search_query = "token".to_string();

        assert_eq!(
            summary(&app),
            vec![
                ("secrets", "2".to_string()),
                ("versions", "0".to_string()),
                ("search", "\"token\"".to_string()),
            ]
        );
    }
}
