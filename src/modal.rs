//! Input-owning overlays.
//!
//! At most one modal is active at a time. While it is, every action goes to
//! [`Modal::update`] and the returned [`ModalOutcome`] tells the controller
//! what to do next.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::catalog::SecretEntry;
use crate::event::Action;
use crate::restore::RestoreRequest;
use crate::secret_store::SecretInfo;
use crate::validation::validate_project_id;

/// Longest annotation value shown in full by the info modal.
const ANNOTATION_MAX_LEN: usize = 50;

/// Upper bound for text typed into a modal input.
const INPUT_CHAR_LIMIT: usize = 128;

/// What a modal wants the controller to do after handling an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOutcome {
    /// Keep the modal open
    Pending,
    /// Close the modal without doing anything
    Dismissed,
    /// A confirm question was answered
    Answered(bool),
    /// A content search query was submitted
    SearchSubmitted(String),
    /// A valid project ID was entered
    ProjectChosen(String),
    /// Quit the application
    Quit,
}

/// Common behavior of all modals.
pub trait Modal {
    fn update(&mut self, action: &Action) -> ModalOutcome;

    /// Whether the modal reads free text (keys arrive as characters).
    fn takes_text(&self) -> bool {
        false
    }
}

/// Work held by a confirm dialog until it is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalContinuation {
    /// Publish an edited payload as a new version of `title`
    EditCommit { title: String, payload: Vec<u8> },
    /// Copy an old version back as the latest one
    RestoreCommit(RestoreRequest),
}

/// A yes/no question carrying its continuation.
#[derive(Debug, Clone)]
pub struct Confirm {
    question: String,
    continuation: ModalContinuation,
    /// true while "Yes" is highlighted
    choice: bool,
}

impl Confirm {
    pub fn new(question: impl Into<String>, continuation: ModalContinuation) -> Self {
        Self {
            question: question.into(),
            continuation,
            choice: true,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn choice(&self) -> bool {
        self.choice
    }

    pub fn continuation(&self) -> &ModalContinuation {
        &self.continuation
    }

    pub fn into_continuation(self) -> ModalContinuation {
        self.continuation
    }
}

impl Modal for Confirm {
    fn update(&mut self, action: &Action) -> ModalOutcome {
        match action {
            Action::Left | Action::Right => {
                self.choice = !self.choice;
                ModalOutcome::Pending
            }
            Action::Yes => ModalOutcome::Answered(true),
            Action::No => ModalOutcome::Answered(false),
            Action::Enter => ModalOutcome::Answered(self.choice),
            Action::Back => ModalOutcome::Dismissed,
            // A pending answer is never dropped by quitting
            _ => ModalOutcome::Pending,
        }
    }
}

/// Text prompt for a project ID with suggestions.
#[derive(Debug, Clone)]
pub struct ProjectSelector {
    input: String,
    known: Vec<String>,
    /// Index into the current suggestions
    highlighted: usize,
    alert: Option<String>,
    error: Option<String>,
    dismissible: bool,
}

impl ProjectSelector {
    /// Creates a selector suggesting `known` project IDs.
    ///
    /// A selector that is not `dismissible` ignores Esc; it is used while no
    /// project has been chosen yet.
    pub fn new(known: Vec<String>, dismissible: bool) -> Self {
        Self {
            input: String::new(),
            known,
            highlighted: 0,
            alert: None,
            error: None,
            dismissible,
        }
    }

    pub fn with_alert(mut self, alert: impl Into<String>) -> Self {
        self.alert = Some(alert.into());
        self
    }

    /// Adds more project IDs to the suggestion pool, skipping duplicates.
    pub fn add_suggestions(&mut self, ids: &[String]) {
        for id in ids {
            if !self.known.contains(id) {
                self.known.push(id.clone());
            }
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Validation error for the last submitted value.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Known IDs that extend what has been typed so far.
    pub fn suggestions(&self) -> Vec<&str> {
        self.known
            .iter()
            .map(String::as_str)
            .filter(|id| id.starts_with(self.input.as_str()) && *id != self.input)
            .collect()
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    fn cycle(&mut self, forward: bool) {
        let count = self.suggestions().len();
        if count == 0 {
            return;
        }
        self.highlighted = if forward {
            (self.highlighted + 1) % count
        } else {
            (self.highlighted + count - 1) % count
        };
    }

    fn edited(&mut self) {
        self.highlighted = 0;
        self.error = None;
    }
}

impl Modal for ProjectSelector {
    fn update(&mut self, action: &Action) -> ModalOutcome {
        match action {
            Action::Char(c) => {
                if self.input.chars().count() < INPUT_CHAR_LIMIT {
                    self.input.push(*c);
                }
                self.edited();
            }
            Action::Backspace => {
                self.input.pop();
                self.edited();
            }
            Action::Down => self.cycle(true),
            Action::Up => self.cycle(false),
            Action::Complete => {
                if let Some(id) = self.suggestions().get(self.highlighted) {
                    self.input = id.to_string();
                    self.edited();
                }
            }
            Action::Enter => {
                let id = self.input.trim().to_string();
                return match validate_project_id(&id) {
                    Ok(()) => ModalOutcome::ProjectChosen(id),
                    Err(e) => {
                        self.error = Some(e);
                        ModalOutcome::Pending
                    }
                };
            }
            Action::Back if self.dismissible => return ModalOutcome::Dismissed,
            Action::Quit => return ModalOutcome::Quit,
            _ => {}
        }
        ModalOutcome::Pending
    }

    fn takes_text(&self) -> bool {
        true
    }
}

/// Single-line content search prompt.
#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    query: String,
}

impl SearchForm {
    /// Opens the form pre-filled with the active query.
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

impl Modal for SearchForm {
    fn update(&mut self, action: &Action) -> ModalOutcome {
        match action {
            Action::Char(c) => {
                if self.query.chars().count() < INPUT_CHAR_LIMIT {
                    self.query.push(*c);
                }
            }
            Action::Backspace => {
                self.query.pop();
            }
            Action::Enter => return ModalOutcome::SearchSubmitted(self.query.trim().to_string()),
            Action::Back => return ModalOutcome::Dismissed,
            Action::Quit => return ModalOutcome::Quit,
            _ => {}
        }
        ModalOutcome::Pending
    }

    fn takes_text(&self) -> bool {
        true
    }
}

/// Read-only metadata view for the selected row.
#[derive(Debug, Clone)]
pub struct SecretInfoDisplay {
    info: SecretInfo,
    entry: SecretEntry,
}

impl SecretInfoDisplay {
    pub fn new(info: SecretInfo, entry: SecretEntry) -> Self {
        Self { info, entry }
    }

    pub fn info(&self) -> &SecretInfo {
        &self.info
    }

    pub fn entry(&self) -> &SecretEntry {
        &self.entry
    }

    pub fn title(&self) -> String {
        if self.entry.is_version() {
            format!("Secret Information - Version {}", self.entry.version)
        } else {
            "Secret Information - Current Version".to_string()
        }
    }

    /// Version label of the selected row ("current" for the head).
    pub fn version_label(&self) -> String {
        if self.entry.is_version() {
            self.entry.version.to_string()
        } else {
            "current".to_string()
        }
    }

    pub fn labels(&self) -> Vec<(String, String)> {
        sorted_pairs(&self.info.labels, usize::MAX)
    }

    /// Annotations with long values shortened.
    pub fn annotations(&self) -> Vec<(String, String)> {
        sorted_pairs(&self.info.annotations, ANNOTATION_MAX_LEN)
    }
}

impl Modal for SecretInfoDisplay {
    fn update(&mut self, action: &Action) -> ModalOutcome {
        match action {
            Action::Back | Action::Enter | Action::Quit => ModalOutcome::Dismissed,
            _ => ModalOutcome::Pending,
        }
    }
}

fn sorted_pairs(map: &HashMap<String, String>, max_len: usize) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = map
        .iter()
        .map(|(k, v)| (k.clone(), truncate(v, max_len)))
        .collect();
    pairs.sort();
    pairs
}

fn truncate(value: &str, max_len: usize) -> String {
    if value.chars().count() <= max_len {
        return value.to_string();
    }
    let kept: String = value.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Formats the time elapsed since `then` as a short human-readable age.
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(then);
    let hours = age.num_seconds() as f64 / 3600.0;

    if hours > 24.0 {
        return match age.num_days() {
            1 => "1 day ago".to_string(),
            days => format!("{days} days ago"),
        };
    }

    if hours > 1.0 {
        return match age.num_hours() {
            1 => "1 hour ago".to_string(),
            h => format!("{h} hours ago"),
        };
    }

    match age.num_minutes() {
        m if m <= 1 => "just now".to_string(),
        m => format!("{m} minutes ago"),
    }
}

/// The one active modal.
#[derive(Debug, Clone)]
pub enum ActiveModal {
    Confirm(Confirm),
    ProjectSelector(ProjectSelector),
    Search(SearchForm),
    Info(SecretInfoDisplay),
}

impl Modal for ActiveModal {
    fn update(&mut self, action: &Action) -> ModalOutcome {
        match self {
            ActiveModal::Confirm(m) => m.update(action),
            ActiveModal::ProjectSelector(m) => m.update(action),
            ActiveModal::Search(m) => m.update(action),
            ActiveModal::Info(m) => m.update(action),
        }
    }

    fn takes_text(&self) -> bool {
        match self {
            ActiveModal::Confirm(m) => m.takes_text(),
            ActiveModal::ProjectSelector(m) => m.takes_text(),
            ActiveModal::Search(m) => m.takes_text(),
            ActiveModal::Info(m) => m.takes_text(),
        }
    }
}
