//! UI rendering module.
//!
//! This module handles all the terminal UI rendering using Ratatui.
//! The secrets list and the detail pane sit side by side; an active modal
//! is drawn on top of them.

mod colors;
mod detail;
mod dialogs;
mod empty;
mod header;
pub(crate) mod highlight;
mod lists;
mod status;
mod utils;

use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

use crate::app::App;
use crate::constants::layout;

use detail::draw_detail;
use dialogs::draw_modal;
use empty::draw_empty_state;
use header::draw_header;
use lists::draw_secrets_list;
use status::{draw_commands_bar, draw_status_bar};
use utils::split_width;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &App) {
    // Header, content, commands bar, status bar
    let [header, content, commands, status] = Layout::vertical([
        Constraint::Length(layout::HEADER_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(layout::COMMANDS_BAR_HEIGHT),
        Constraint::Length(layout::STATUS_BAR_HEIGHT),
    ])
    .areas(frame.area());

    draw_header(frame, header, app);

    if app.context.is_some() {
        let (list_area, detail_area) = split_width(content, app.list_width);
        draw_secrets_list(frame, list_area, app);
        draw_detail(frame, detail_area, app);
    } else {
        draw_empty_state(
            frame,
            content,
            "No project selected",
            "Press 'p' to choose a Google Cloud project",
        );
    }

    draw_commands_bar(frame, commands, app);
    draw_status_bar(frame, status, app);

    if let Some(modal) = &app.modal {
        draw_modal(frame, modal);
    }
}
