//! Empty state rendering.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::colors;

/// Draws a centered message with a hint below it.
pub fn draw_empty_state(frame: &mut Frame, area: Rect, title: &str, hint: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::BORDER))
        .border_set(symbols::border::ROUNDED);

    // Push the text to roughly a third of the height
    let top = usize::from(area.height / 3);
    let mut content = vec![Line::from(""); top];
    content.push(Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(colors::PRIMARY).bold(),
    )));
    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        hint.to_string(),
        Style::default().fg(colors::MUTED),
    )));

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}
