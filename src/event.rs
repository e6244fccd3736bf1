//! Event handling module.
//!
//! This module handles keyboard and terminal events using crossterm.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::constants::POLL_TIMEOUT;

/// Represents the different actions a user can take in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Quit the application
    Quit,
    /// Move selection up (or scroll up)
    Up,
    /// Move selection down (or scroll down)
    Down,
    /// Move to the top of the list
    Top,
    /// Move to the bottom of the list
    Bottom,
    /// Confirm / submit
    Enter,
    /// Escape: cancel a modal or clear a filter
    Back,
    /// Move the confirm choice left
    Left,
    /// Move the confirm choice right
    Right,
    /// Answer yes in a confirm dialog
    Yes,
    /// Answer no in a confirm dialog
    No,
    /// Reload the secrets list
    Refresh,
    /// Edit the selected payload in the external editor
    Edit,
    /// Restore the selected version
    Restore,
    /// Expand or collapse the versions of the selected secret
    ToggleVersions,
    /// Open the content search form
    Search,
    /// Show metadata for the selected secret
    Info,
    /// Switch focus between the list and the detail pane
    ToggleFocus,
    /// Open the project selector
    OpenProjectSelector,
    /// Start filtering the focused component
    Filter,
    /// Make the list column wider
    WidenList,
    /// Make the list column narrower
    NarrowList,
    /// Accept the current suggestion (text entry mode)
    Complete,
    /// Character input (for text entry mode)
    Char(char),
    /// Backspace key (for text entry mode)
    Backspace,
}

/// Handles terminal events and converts them to application actions.
pub struct EventHandler {
    /// Timeout for polling events
    poll_timeout: Duration,
}

impl EventHandler {
    /// Creates a new event handler with default settings.
    pub fn new() -> Self {
        Self {
            poll_timeout: POLL_TIMEOUT,
        }
    }

    /// Polls for the next event and converts it to an Action.
    ///
    /// Returns Ok(None) if no event is available within the timeout.
    pub fn next(&self) -> io::Result<Option<Action>> {
        self.poll(Self::key_to_action)
    }

    /// Polls for input-mode events (for text entry).
    pub fn next_input(&self) -> io::Result<Option<Action>> {
        self.poll(Self::key_to_input_action)
    }

    fn poll(&self, map: fn(KeyEvent) -> Option<Action>) -> io::Result<Option<Action>> {
        if event::poll(self.poll_timeout)? {
            if let Event::Key(key_event) = event::read()? {
                // Only process key press events (not releases)
                if key_event.kind == KeyEventKind::Press {
                    return Ok(map(key_event));
                }
            }
        }
        Ok(None)
    }

    /// Converts a key event to an input-mode action.
    pub(crate) fn key_to_input_action(key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        match key.code {
            KeyCode::Enter => Some(Action::Enter),
            KeyCode::Esc => Some(Action::Back),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Tab => Some(Action::Complete),
            KeyCode::Up => Some(Action::Up),
            KeyCode::Down => Some(Action::Down),
            KeyCode::Char(c) => Some(Action::Char(c)),
            _ => None,
        }
    }

    /// Converts a key event to an application action.
    pub(crate) fn key_to_action(key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Action::Quit),
                KeyCode::Char('f') => Some(Action::Search),
                KeyCode::Char('r') => Some(Action::Refresh),
                _ => None,
            };
        }

        if key.modifiers.contains(KeyModifiers::SHIFT) {
            match key.code {
                KeyCode::Right => return Some(Action::WidenList),
                KeyCode::Left => return Some(Action::NarrowList),
                _ => {}
            }
        }

        match key.code {
            // Navigation
            KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
            KeyCode::Home | KeyCode::Char('g') => Some(Action::Top),
            KeyCode::End | KeyCode::Char('G') => Some(Action::Bottom),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::Left),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::Right),
            KeyCode::Enter => Some(Action::Enter),
            KeyCode::Esc => Some(Action::Back),
            KeyCode::Tab => Some(Action::ToggleFocus),

            // Actions
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::F(5) => Some(Action::Refresh),
            KeyCode::Char('e') => Some(Action::Edit),
            KeyCode::Char('r') => Some(Action::Restore),
            KeyCode::Char('v') => Some(Action::ToggleVersions),
            KeyCode::Char('i') => Some(Action::Info),
            KeyCode::Char('p') => Some(Action::OpenProjectSelector),
            KeyCode::Char('/') => Some(Action::Filter),
            KeyCode::Char('y') => Some(Action::Yes),
            KeyCode::Char('n') => Some(Action::No),

            // No matching action
            _ => None,
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn make_key_event(code: KeyCode) -> KeyEvent {
        make_modified_key_event(code, KeyModifiers::NONE)
    }

    fn make_modified_key_event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_vim_navigation_keys() {
        assert_eq!(
            EventHandler::key_to_action(make_key_event(KeyCode::Char('j'))),
            Some(Action::Down)
        );
        assert_eq!(
            EventHandler::key_to_action(make_key_event(KeyCode::Char('k'))),
            Some(Action::Up)
        );
        assert_eq!(
            EventHandler::key_to_action(make_key_event(KeyCode::Char('g'))),
            Some(Action::Top)
        );
        assert_eq!(
            EventHandler::key_to_action(make_key_event(KeyCode::Char('G'))),
            Some(Action::Bottom)
        );
    }

    #[test]
    fn test_session_keys() {
        assert_eq!(
            EventHandler::key_to_action(make_key_event(KeyCode::Char('e'))),
            Some(Action::Edit)
        );
        assert_eq!(
            EventHandler::key_to_action(make_key_event(KeyCode::Char('r'))),
            Some(Action::Restore)
        );
        assert_eq!(
            EventHandler::key_to_action(make_key_event(KeyCode::Char('v'))),
            Some(Action::ToggleVersions)
        );
        assert_eq!(
            EventHandler::key_to_action(make_key_event(KeyCode::Char('i'))),
            Some(Action::Info)
        );
        assert_eq!(
            EventHandler::key_to_action(make_key_event(KeyCode::Tab)),
            Some(Action::ToggleFocus)
        );
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(
            EventHandler::key_to_action(make_modified_key_event(
                KeyCode::Char('f'),
                KeyModifiers::CONTROL
            )),
            Some(Action::Search)
        );
        assert_eq!(
            EventHandler::key_to_action(make_modified_key_event(
                KeyCode::Char('r'),
                KeyModifiers::CONTROL
            )),
            Some(Action::Refresh)
        );
        assert_eq!(
            EventHandler::key_to_action(make_modified_key_event(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL
            )),
            Some(Action::Quit)
        );
        assert_eq!(
            EventHandler::key_to_action(make_key_event(KeyCode::F(5))),
            Some(Action::Refresh)
        );
    }

    #[test]
    fn test_shift_arrows_resize_list() {
        assert_eq!(
            EventHandler::key_to_action(make_modified_key_event(KeyCode::Right, KeyModifiers::SHIFT)),
            Some(Action::WidenList)
        );
        assert_eq!(
            EventHandler::key_to_action(make_modified_key_event(KeyCode::Left, KeyModifiers::SHIFT)),
            Some(Action::NarrowList)
        );
        assert_eq!(
            EventHandler::key_to_action(make_key_event(KeyCode::Left)),
            Some(Action::Left)
        );
    }

    #[test]
    fn test_unknown_key_returns_none() {
        assert_eq!(
            EventHandler::key_to_action(make_key_event(KeyCode::Char('z'))),
            None
        );
        assert_eq!(EventHandler::key_to_action(make_key_event(KeyCode::F(12))), None);
    }

    #[test]
    fn test_input_mode_actions() {
        assert_eq!(
            EventHandler::key_to_input_action(make_key_event(KeyCode::Enter)),
            Some(Action::Enter)
        );
        assert_eq!(
            EventHandler::key_to_input_action(make_key_event(KeyCode::Esc)),
            Some(Action::Back)
        );
        assert_eq!(
            EventHandler::key_to_input_action(make_key_event(KeyCode::Backspace)),
            Some(Action::Backspace)
        );
        assert_eq!(
            EventHandler::key_to_input_action(make_key_event(KeyCode::Tab)),
            Some(Action::Complete)
        );
        // Keys bound to actions in normal mode are plain text here
        assert_eq!(
            EventHandler::key_to_input_action(make_key_event(KeyCode::Char('q'))),
            Some(Action::Char('q'))
        );
    }

    #[test]
    fn test_input_mode_ctrl_c_quits() {
        assert_eq!(
            EventHandler::key_to_input_action(make_modified_key_event(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL
            )),
            Some(Action::Quit)
        );
    }
}
