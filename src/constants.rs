//! Application-wide constants.
//!
//! Centralizes magic numbers and configuration values for maintainability.

use std::time::Duration;

/// Event polling timeout - balances responsiveness with CPU usage.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// How long a status message stays visible.
pub const STATUS_TTL: Duration = Duration::from_secs(3);

/// Number of base64 characters shown for a non-printable payload.
pub const BINARY_PREVIEW_LEN: usize = 64;

/// Name of the directory holding config.toml under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "gsmedit";

/// Layout dimensions for the main UI structure.
pub mod layout {
    /// Header height including ASCII art and info panel.
    pub const HEADER_HEIGHT: u16 = 6;
    /// Commands bar height.
    pub const COMMANDS_BAR_HEIGHT: u16 = 3;
    /// Status bar height.
    pub const STATUS_BAR_HEIGHT: u16 = 1;
}

/// Secrets list column width (percentage of the content area).
pub mod list_width {
    pub const DEFAULT: u16 = 35;
    pub const MIN: u16 = 15;
    pub const MAX: u16 = 70;
    /// Change per Shift+arrow press.
    pub const STEP: u16 = 5;
}

/// Dialog dimensions (percentages of screen size).
pub mod dialog {
    /// Search form width percentage.
    pub const INPUT_WIDTH: u16 = 50;
    /// Search form height percentage.
    pub const INPUT_HEIGHT: u16 = 25;
    /// Confirm dialog width percentage.
    pub const CONFIRM_WIDTH: u16 = 55;
    /// Confirm dialog height percentage.
    pub const CONFIRM_HEIGHT: u16 = 30;
    /// Project selector width percentage.
    pub const PROJECT_SELECTOR_WIDTH: u16 = 60;
    /// Project selector height percentage.
    pub const PROJECT_SELECTOR_HEIGHT: u16 = 60;
    /// Secret info width percentage.
    pub const INFO_WIDTH: u16 = 65;
    /// Secret info height percentage.
    pub const INFO_HEIGHT: u16 = 70;
}
