//! Detail pane rendering: the selected payload, with filter matches highlighted.

use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    symbols,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use crate::app::{App, Focus};
use crate::catalog::SecretEntry;
use crate::detail::{DetailContent, FailureKind};

use super::colors;
use super::dialogs::BLOCK_CURSOR;

/// Draws the detail pane for the selected entry.
pub fn draw_detail(frame: &mut Frame, area: Rect, app: &App) {
    let border = if app.focus == Focus::Detail && app.modal.is_none() {
        colors::FOCUS_BORDER
    } else {
        colors::BORDER
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .border_set(symbols::border::ROUNDED)
        .title(title(&app.catalog.selected_entry()))
        .title_bottom(filter_line(app))
        .padding(Padding::horizontal(1));

    let paragraph = match app.detail.content() {
        DetailContent::Empty => Paragraph::new(Span::styled(
            "Select a secret to see its value",
            Style::default().fg(colors::MUTED),
        )),
        DetailContent::Loading => Paragraph::new(Span::styled(
            "Loading...",
            Style::default().fg(colors::WARNING),
        )),
        DetailContent::Ready(text) => {
            let filter = app.detail_view.filter();
            let text = if filter.is_empty() {
                text.clone()
            } else {
                highlight_matches(text, filter)
            };
            Paragraph::new(text).scroll((app.detail_view.scroll, 0))
        }
        DetailContent::Failed { kind, message } => {
            let heading = match kind {
                FailureKind::Fetch => "Could not load this secret",
                FailureKind::Corruption => "Integrity check failed",
            };
            Paragraph::new(vec![
                Line::from(Span::styled(heading, Style::default().fg(colors::ERROR).bold())),
                Line::from(""),
                Line::from(Span::styled(message.clone(), Style::default().fg(colors::MUTED))),
            ])
        }
    };

    frame.render_widget(paragraph.block(block), area);
}

fn title(entry: &SecretEntry) -> Line<'static> {
    if entry.is_sentinel() {
        return Line::from(Span::styled(" Value ", Style::default().fg(Color::White)));
    }
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            entry.target_title().to_string(),
            Style::default().fg(colors::PRIMARY).bold(),
        ),
    ];
    if entry.is_version() {
        spans.push(Span::styled(
            format!(" @ v{}", entry.version),
            Style::default().fg(colors::ACCENT),
        ));
    }
    spans.push(Span::raw(" "));
    Line::from(spans)
}

fn filter_line(app: &App) -> Line<'static> {
    let view = &app.detail_view;
    if view.is_filtering() {
        Line::from(vec![
            Span::styled(format!(" /{}", view.filter()), Style::default().fg(colors::KEY)),
            Span::styled(BLOCK_CURSOR, Style::default().fg(colors::PRIMARY)),
            Span::raw(" "),
        ])
    } else if view.is_filtered() {
        Line::from(Span::styled(
            format!(" filter: {} ", view.filter()),
            Style::default().fg(colors::MUTED),
        ))
    } else {
        Line::default()
    }
}

/// Marks every occurrence of `needle`, including ones spanning several styled spans.
fn highlight_matches(text: &Text<'static>, needle: &str) -> Text<'static> {
    Text::from(
        text.lines
            .iter()
            .map(|line| highlight_line(line, needle))
            .collect::<Vec<_>>(),
    )
}

fn highlight_line(line: &Line<'static>, needle: &str) -> Line<'static> {
    let full: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
    let mut matched = vec![false; full.len()];
    for (start, m) in full.match_indices(needle) {
        matched[start..start + m.len()].fill(true);
    }
    if !matched.contains(&true) {
        return line.clone();
    }

    let match_style = Style::default().bg(colors::MATCH).fg(Color::Black);
    let mut spans = Vec::new();
    let mut offset = 0;
    for span in &line.spans {
        let content = span.content.as_ref();
        let mut push = |part: &str, hit: bool| {
            let style = if hit {
                span.style.patch(match_style)
            } else {
                span.style
            };
            spans.push(Span::styled(part.to_string(), style));
        };

        let mut run_start = 0;
        let mut run_hit = None;
        for (i, _) in content.char_indices() {
            let hit = matched[offset + i];
            match run_hit {
                Some(current) if current != hit => {
                    push(&content[run_start..i], current);
                    run_start = i;
                    run_hit = Some(hit);
                }
                None => run_hit = Some(hit),
                _ => {}
            }
        }
        if let Some(hit) = run_hit {
            push(&content[run_start..], hit);
        }
        offset += content.len();
    }

    Line::from(spans).style(line.style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_spans_boundaries() {
        let line = Line::from(vec![
            Span::styled("KEY", Style::default().fg(colors::PRIMARY)),
            Span::raw("="),
            Span::raw("value"),
        ]);

        let out = highlight_line(&line, "Y=v");
        let parts: Vec<(&str, bool)> = out
            .spans
            .iter()
            .map(|s| (s.content.as_ref(), s.style.bg == Some(colors::MATCH)))
            .collect();

        assert_eq!(
            parts,
            vec![
                ("KE", false),
                ("Y", true),
                ("=", true),
                ("v", true),
                ("alue", false),
            ]
        );
        // Unmatched parts keep their own colors
        assert_eq!(out.spans[1].style.fg, Some(Color::Black));
        assert_eq!(out.spans[0].style.fg, Some(colors::PRIMARY));
    }

    #[test]
    fn test_line_without_match_is_unchanged() {
        let line = Line::from("nothing here");
        assert_eq!(highlight_line(&line, "zzz"), line);
    }

    #[test]
    fn test_sentinel_title() {
        assert_eq!(title(&SecretEntry::default()).spans[0].content, " Value ");
    }
}
