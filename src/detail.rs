//! Background loading of the selected secret's payload.
//!
//! Every selection change bumps a generation counter; a fetch result is only
//! applied when it carries the latest generation, so the pane always ends up
//! showing the last selection no matter in which order fetches complete.

use ratatui::text::Text;
use tracing::debug;

use crate::catalog::{EntryKey, SecretEntry};
use crate::secret_store::SecretStore;
use crate::ui::highlight::render_payload;

/// Why a detail fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The backend could not be reached or refused the request
    Fetch,
    /// The payload failed its integrity check
    Corruption,
}

/// What the detail pane shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailContent {
    Empty,
    Loading,
    Ready(Text<'static>),
    Failed { kind: FailureKind, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Latest { full_path: String },
    Version { full_path: String, version: u64 },
}

/// A scheduled fetch, to be run off the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub generation: u64,
    pub key: EntryKey,
    target: Target,
}

/// A finished fetch, delivered back to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailLoaded {
    pub generation: u64,
    pub key: EntryKey,
    pub content: DetailContent,
}

/// Detail pane content plus the bookkeeping for superseding stale fetches.
#[derive(Debug)]
pub struct DetailLoader {
    generation: u64,
    current: Option<EntryKey>,
    content: DetailContent,
}

impl Default for DetailLoader {
    fn default() -> Self {
        Self {
            generation: 0,
            current: None,
            content: DetailContent::Empty,
        }
    }
}

impl DetailLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts loading `entry`, superseding any fetch still in flight.
    ///
    /// Returns `None` for the sentinel entry, which resolves immediately to
    /// empty content.
    pub fn schedule(&mut self, entry: &SecretEntry) -> Option<DetailRequest> {
        self.generation += 1;
        self.current = Some(entry.key());

        if entry.is_sentinel() {
            self.content = DetailContent::Empty;
            return None;
        }

        self.content = DetailContent::Loading;
        let target = if entry.is_version() {
            Target::Version {
                full_path: entry.full_path.clone(),
                version: entry.version,
            }
        } else {
            Target::Latest {
                full_path: entry.full_path.clone(),
            }
        };

        debug!(generation = self.generation, path = %entry.full_path, "scheduled detail fetch");
        Some(DetailRequest {
            generation: self.generation,
            key: entry.key(),
            target,
        })
    }

    /// Runs a fetch against the store and renders the result.
    pub async fn fetch(store: &dyn SecretStore, request: DetailRequest) -> DetailLoaded {
        let content = match &request.target {
            Target::Latest { full_path } => match store.get_secret(full_path).await {
                Ok(data) => DetailContent::Ready(render_payload(&data)),
                Err(e) => failure(&e, "Error loading secret"),
            },
            Target::Version { full_path, version } => {
                match store.get_secret_version(full_path, *version).await {
                    Ok(data) => DetailContent::Ready(render_payload(&data)),
                    Err(e) => failure(&e, "Error loading secret version"),
                }
            }
        };

        DetailLoaded {
            generation: request.generation,
            key: request.key,
            content,
        }
    }

    /// Applies a finished fetch if it belongs to the latest selection.
    pub fn apply(&mut self, loaded: DetailLoaded) -> bool {
        if loaded.generation != self.generation {
            debug!(
                stale = loaded.generation,
                latest = self.generation,
                "discarded stale detail fetch"
            );
            return false;
        }
        self.content = loaded.content;
        true
    }

    /// Returns true when `entry` is the one the pane is showing (or loading).
    pub fn is_showing(&self, entry: &SecretEntry) -> bool {
        self.current.as_ref() == Some(&entry.key())
    }

    pub fn content(&self) -> &DetailContent {
        &self.content
    }
}

fn failure(err: &crate::secret_store::StoreError, prefix: &str) -> DetailContent {
    if err.is_corruption() {
        DetailContent::Failed {
            kind: FailureKind::Corruption,
            message: format!("Integrity check failed, refusing to show this payload: {err}"),
        }
    } else {
        DetailContent::Failed {
            kind: FailureKind::Fetch,
            message: format!("{prefix}: {err}"),
        }
    }
}

/// Highlight filter and scroll position of the detail pane.
#[derive(Debug, Default)]
pub struct DetailView {
    pub scroll: u16,
    filter: String,
    editing: bool,
}

impl DetailView {
    pub fn start_filter(&mut self) {
        self.filter.clear();
        self.editing = true;
    }

    pub fn push_char(&mut self, c: char) {
        self.filter.push(c);
    }

    pub fn pop_char(&mut self) {
        self.filter.pop();
    }

    pub fn apply_filter(&mut self) {
        self.editing = false;
    }

    /// Sets an applied filter directly (used to echo a content search).
    pub fn set_filter(&mut self, value: &str) {
        self.filter = value.to_string();
        self.editing = false;
    }

    pub fn clear(&mut self) {
        self.filter.clear();
        self.editing = false;
    }

    pub fn is_filtering(&self) -> bool {
        self.editing
    }

    pub fn is_filtered(&self) -> bool {
        !self.editing && !self.filter.is_empty()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Scrolls to the next line after the current one containing the filter.
    pub fn next_match(&mut self, content: &DetailContent) {
        let DetailContent::Ready(text) = content else {
            return;
        };
        if self.filter.is_empty() {
            return;
        }

        let matches: Vec<u16> = text
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| {
                line.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
                    .contains(&self.filter)
            })
            .filter_map(|(i, _)| u16::try_from(i).ok())
            .collect();

        self.scroll = matches
            .iter()
            .copied()
            .find(|&line| line > self.scroll)
            .or_else(|| matches.first().copied())
            .unwrap_or(self.scroll);
    }
}
