//! Layout helpers.

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Returns a rectangle of the given size (in percent) centered in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}

/// Splits `area` horizontally, giving `percent` of the width to the left pane.
pub fn split_width(area: Rect, percent: u16) -> (Rect, Rect) {
    let [left, right] = Layout::horizontal([
        Constraint::Percentage(percent),
        Constraint::Percentage(100 - percent.min(100)),
    ])
    .areas(area);
    (left, right)
}
