//! Application state and logic.
//!
//! This module contains the core application state, the focus and modal
//! state machine, and the event handling that ties the secrets catalog,
//! the detail pane and the secret store together.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::catalog::{SecretCatalog, SecretEntry};
use crate::constants::{list_width, STATUS_TTL};
use crate::detail::{DetailContent, DetailLoaded, DetailLoader, DetailView};
use crate::edit::{EditOutcome, EditSession};
use crate::event::Action;
use crate::modal::{
    ActiveModal, Confirm, Modal, ModalContinuation, ModalOutcome, ProjectSelector, SearchForm,
    SecretInfoDisplay,
};
use crate::restore::{self, RestoreOutcome, RestoreRequest};
use crate::secret_store::{SecretStore, StoreError};

/// The project the app is working against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppContext {
    pub project_id: String,
}

/// Results delivered by background tasks.
#[derive(Debug)]
pub enum AppEvent {
    DetailLoaded(DetailLoaded),
    /// Project IDs for the selector's suggestions
    ProjectsLoaded(Vec<String>),
}

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Status message to display to the user.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    /// The message text
    pub text: String,
    /// Whether this is an error message
    pub is_error: bool,
    set_at: Instant,
}

impl StatusMessage {
    fn is_expired(&self) -> bool {
        self.set_at.elapsed() >= STATUS_TTL
    }
}

/// What the main loop should do after an event.
#[derive(Debug)]
pub enum Flow {
    Continue,
    Quit,
    /// Suspend the terminal and hand this session to the editor
    Edit(EditSession),
    /// Connect to another project
    SwitchProject(String),
}

/// Main application state.
pub struct App {
    /// Active project, `None` until one is chosen
    pub context: Option<AppContext>,
    store: Option<Arc<dyn SecretStore>>,
    pub catalog: SecretCatalog,
    pub detail: DetailLoader,
    pub detail_view: DetailView,
    pub focus: Focus,
    pub modal: Option<ActiveModal>,
    pub status: Option<StatusMessage>,
    /// Width of the secrets list column, in percent
    pub list_width: u16,
    /// Query of the active content search
    pub search_query: String,
    known_projects: Vec<String>,
    scratch_dir: PathBuf,
    tx: UnboundedSender<AppEvent>,
}

impl App {
    /// Creates an app with no project attached.
    pub fn new(known_projects: Vec<String>, scratch_dir: PathBuf, tx: UnboundedSender<AppEvent>) -> Self {
        Self {
            context: None,
            store: None,
            catalog: SecretCatalog::new(),
            detail: DetailLoader::new(),
            detail_view: DetailView::default(),
            focus: Focus::List,
            modal: None,
            status: None,
            list_width: list_width::DEFAULT,
            search_query: String::new(),
            known_projects,
            scratch_dir,
            tx,
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.project_id.as_str())
    }

    /// Whether keys should be read as text.
    pub fn takes_text(&self) -> bool {
        match &self.modal {
            Some(modal) => modal.takes_text(),
            None => self.catalog.is_filtering() || self.detail_view.is_filtering(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.detail.content(), DetailContent::Loading)
    }

    fn set_status(&mut self, text: &str, is_error: bool) {
        self.status = Some(StatusMessage {
            text: text.to_string(),
            is_error,
            set_at: Instant::now(),
        });
    }

    /// Drops the status message once it has been shown long enough.
    pub fn expire_status(&mut self) {
        if self.status.as_ref().is_some_and(StatusMessage::is_expired) {
            self.status = None;
        }
    }

    fn store(&mut self) -> Option<Arc<dyn SecretStore>> {
        if self.store.is_none() {
            self.set_status(&StoreError::NotConnected.to_string(), true);
        }
        self.store.clone()
    }

    // --- Project lifecycle ---

    /// Switches to `context` if its secrets can be listed.
    ///
    /// On failure the previous project stays active and the project selector
    /// reopens with an alert. Returns whether the switch happened.
    pub async fn attach(&mut self, context: AppContext, store: Arc<dyn SecretStore>) -> bool {
        info!(project = %context.project_id, "attaching to project");
        let secrets = match store.list_secrets().await {
            Ok(secrets) => secrets,
            Err(e) => {
                error!(project = %context.project_id, error = %e, "error listing secrets");
                self.connection_failed(&context.project_id);
                return false;
            }
        };

        if !self.known_projects.contains(&context.project_id) {
            self.known_projects.push(context.project_id.clone());
        }
        self.context = Some(context);
        self.store = Some(store);
        self.modal = None;
        self.focus = Focus::List;
        self.search_query.clear();
        self.detail_view.clear();
        self.catalog.populate_from(&secrets);
        self.set_status(&format!("Loaded {} secrets", secrets.len()), false);
        self.reload_detail();
        true
    }

    /// Reports an unreachable project and asks for another one.
    pub fn connection_failed(&mut self, project_id: &str) {
        self.set_status(&format!("Could not load secrets for {project_id}"), true);
        self.open_project_selector(Some(format!("Could not access project {project_id}")));
    }

    pub fn open_project_selector(&mut self, alert: Option<String>) {
        let selector = ProjectSelector::new(self.known_projects.clone(), self.context.is_some());
        let selector = match alert {
            Some(alert) => selector.with_alert(alert),
            None => selector,
        };
        self.modal = Some(ActiveModal::ProjectSelector(selector));
    }

    /// Reloads the full listing. Returns whether it succeeded.
    async fn load_secrets(&mut self) -> bool {
        let Some(store) = self.store() else {
            return false;
        };
        match store.list_secrets().await {
            Ok(secrets) => {
                self.catalog.populate_from(&secrets);
                self.reload_detail();
                true
            }
            Err(e) => {
                error!(error = %e, "error listing secrets");
                self.set_status("Error loading secrets", true);
                false
            }
        }
    }

    // --- Background results ---

    /// Folds a background task result into the state.
    pub fn handle_background(&mut self, event: AppEvent) {
        match event {
            AppEvent::DetailLoaded(loaded) => {
                if self.detail.apply(loaded) {
                    self.detail_view.scroll = 0;
                }
            }
            AppEvent::ProjectsLoaded(ids) => {
                for id in &ids {
                    if !self.known_projects.contains(id) {
                        self.known_projects.push(id.clone());
                    }
                }
                if let Some(ActiveModal::ProjectSelector(selector)) = &mut self.modal {
                    selector.add_suggestions(&ids);
                }
            }
        }
    }

    /// Schedules a detail fetch when the selection moved to another row.
    fn sync_detail(&mut self) {
        let entry = self.catalog.selected_entry();
        if !self.detail.is_showing(&entry) {
            self.load_detail(&entry);
        }
    }

    fn load_detail(&mut self, entry: &SecretEntry) {
        let Some(request) = self.detail.schedule(entry) else {
            return;
        };
        let Some(store) = self.store.clone() else {
            return;
        };
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let loaded = DetailLoader::fetch(store.as_ref(), request).await;
            // The receiver is gone once the app is shutting down
            let _ = tx.send(AppEvent::DetailLoaded(loaded));
        });
    }

    // --- Event handling ---

    /// Handles an action and tells the main loop what to do next.
    pub async fn handle_event(&mut self, action: Action) -> Flow {
        // The selector replaces any modal that is not reading text
        if action == Action::OpenProjectSelector && !self.takes_text() {
            self.open_project_selector(None);
            return Flow::Continue;
        }

        let flow = if let Some(modal) = self.modal.as_mut() {
            let outcome = modal.update(&action);
            self.resolve_modal(outcome).await
        } else if self.catalog.is_filtering() {
            self.handle_list_filter(action);
            Flow::Continue
        } else if self.detail_view.is_filtering() {
            self.handle_detail_filter(action);
            Flow::Continue
        } else {
            self.handle_normal(action).await
        };

        self.sync_detail();
        flow
    }

    async fn handle_normal(&mut self, action: Action) -> Flow {
        match action {
            Action::Quit => return Flow::Quit,
            Action::OpenProjectSelector => self.open_project_selector(None),
            Action::Edit => {
                if let Some(session) = self.begin_edit().await {
                    return Flow::Edit(session);
                }
            }
            Action::Restore => self.begin_restore(),
            Action::ToggleVersions => self.toggle_versions().await,
            Action::Search => {
                self.modal = Some(ActiveModal::Search(SearchForm::new(&self.search_query)));
            }
            Action::Info => self.show_info().await,
            Action::ToggleFocus => {
                self.focus = match self.focus {
                    Focus::List => Focus::Detail,
                    Focus::Detail => Focus::List,
                };
                self.detail_view.set_filter(&self.search_query);
            }
            Action::Refresh => self.refresh().await,
            Action::Filter => match self.focus {
                Focus::List => self.catalog.start_filter(),
                Focus::Detail => self.detail_view.start_filter(),
            },
            Action::WidenList => {
                self.list_width = (self.list_width + list_width::STEP).min(list_width::MAX);
            }
            Action::NarrowList => {
                self.list_width = self
                    .list_width
                    .saturating_sub(list_width::STEP)
                    .max(list_width::MIN);
            }
            Action::Back => match self.focus {
                Focus::List => self.catalog.clear_filter(),
                Focus::Detail => self.detail_view.clear(),
            },
            action => match self.focus {
                Focus::List => self.navigate_list(action),
                Focus::Detail => self.navigate_detail(action),
            },
        }
        Flow::Continue
    }

    fn navigate_list(&mut self, action: Action) {
        match action {
            Action::Up => self.catalog.select_previous(),
            Action::Down => self.catalog.select_next(),
            Action::Top => self.catalog.select_first(),
            Action::Bottom => self.catalog.select_last(),
            _ => {}
        }
    }

    fn navigate_detail(&mut self, action: Action) {
        match action {
            Action::Up => self.detail_view.scroll_up(),
            Action::Down => self.detail_view.scroll_down(),
            Action::Top => self.detail_view.scroll = 0,
            Action::Enter => self.detail_view.next_match(self.detail.content()),
            _ => {}
        }
    }

    fn handle_list_filter(&mut self, action: Action) {
        match action {
            Action::Char(c) => self.catalog.push_filter_char(c),
            Action::Backspace => self.catalog.pop_filter_char(),
            Action::Enter => self.catalog.apply_filter(),
            Action::Back => self.catalog.clear_filter(),
            Action::Up => self.catalog.select_previous(),
            Action::Down => self.catalog.select_next(),
            _ => {}
        }
    }

    fn handle_detail_filter(&mut self, action: Action) {
        match action {
            Action::Char(c) => self.detail_view.push_char(c),
            Action::Backspace => self.detail_view.pop_char(),
            Action::Enter => {
                self.detail_view.apply_filter();
                self.detail_view.next_match(self.detail.content());
            }
            Action::Back => self.detail_view.clear(),
            _ => {}
        }
    }

    async fn resolve_modal(&mut self, outcome: ModalOutcome) -> Flow {
        match outcome {
            ModalOutcome::Pending => {}
            ModalOutcome::Quit => return Flow::Quit,
            ModalOutcome::Dismissed => self.modal = None,
            ModalOutcome::Answered(accepted) => {
                if let Some(ActiveModal::Confirm(confirm)) = self.modal.take() {
                    self.run_continuation(confirm.into_continuation(), accepted)
                        .await;
                }
            }
            ModalOutcome::SearchSubmitted(query) => {
                self.modal = None;
                self.search(query).await;
            }
            ModalOutcome::ProjectChosen(project_id) => {
                self.modal = None;
                return Flow::SwitchProject(project_id);
            }
        }
        Flow::Continue
    }

    // --- Commands ---

    async fn refresh(&mut self) {
        if !self.load_secrets().await {
            return;
        }
        self.set_status("Secrets refreshed", false);
        self.search_query.clear();
        self.detail_view.clear();
        self.focus = Focus::List;
    }

    async fn toggle_versions(&mut self) {
        if self.catalog.collapse_versions() {
            return;
        }

        let selected = self.catalog.selected_entry();
        if selected.is_sentinel() {
            self.set_status("No secret selected", true);
            return;
        }
        let Some(store) = self.store() else {
            return;
        };

        let mut versions = match store.list_versions(&selected.full_path).await {
            Ok(versions) => versions,
            Err(e) => {
                error!(error = %e, "error getting secret versions");
                self.set_status("Error getting secret versions", true);
                return;
            }
        };

        // The latest version is already shown by the Current row
        let latest = versions.iter().map(|v| v.version).max();
        versions.retain(|v| Some(v.version) != latest);
        versions.sort_by(|a, b| b.version.cmp(&a.version));

        let inserted = self.catalog.expand_versions(&selected, &versions);
        debug!(secret = %selected.title, inserted, "expanded versions");
        self.set_status(&format!("Secret has {inserted} versions"), false);
    }

    async fn show_info(&mut self) {
        let selected = self.catalog.selected_entry();
        if selected.is_sentinel() {
            self.set_status("No secret selected", true);
            return;
        }
        let Some(store) = self.store() else {
            return;
        };

        match store.get_secret_info(&selected.full_path).await {
            Ok(info) => {
                self.modal = Some(ActiveModal::Info(SecretInfoDisplay::new(info, selected)));
            }
            Err(e) => {
                error!(error = %e, "error getting secret info");
                self.set_status("Error getting secret info", true);
            }
        }
    }

    async fn search(&mut self, query: String) {
        if query.is_empty() {
            self.refresh().await;
            return;
        }
        let Some(store) = self.store() else {
            return;
        };

        info!(%query, "searching secret payloads");
        match store.search_by_content(&query).await {
            Ok(found) => {
                self.catalog.populate_from(&found);
                self.reload_detail();
                self.detail_view.set_filter(&query);
                self.set_status(&format!("Found {} secrets", found.len()), false);
                self.search_query = query;
            }
            Err(e) => {
                error!(error = %e, "error searching secrets");
                self.set_status("Error searching secrets", true);
            }
        }
    }

    /// Fetches the selected payload and prepares an editor session.
    async fn begin_edit(&mut self) -> Option<EditSession> {
        let selected = self.catalog.selected_entry();
        if selected.is_sentinel() {
            self.set_status("No secret selected", true);
            return None;
        }
        let store = self.store()?;

        let payload = if selected.is_version() {
            store
                .get_secret_version(&selected.full_path, selected.version)
                .await
        } else {
            store.get_secret(&selected.full_path).await
        };
        let payload = match payload {
            Ok(payload) => payload,
            Err(e) if e.is_corruption() => {
                error!(error = %e, "refusing to edit corrupted payload");
                self.set_status("Secret version failed its integrity check", true);
                return None;
            }
            Err(e) => {
                error!(error = %e, "error getting secret for edit");
                self.set_status("Error getting secret", true);
                return None;
            }
        };

        match EditSession::begin(&selected, payload, &self.scratch_dir) {
            Ok(session) => Some(session),
            Err(e) => {
                error!(error = %e, "error preparing scratch file");
                self.set_status("Failed to create temporary file", true);
                None
            }
        }
    }

    /// Receives the result of an editor round trip.
    pub fn finish_edit(&mut self, result: Result<EditOutcome>) {
        match result {
            Ok(EditOutcome::Unchanged) => self.set_status("No changes detected", false),
            Ok(EditOutcome::Changed { title, payload }) => {
                self.set_status("Changes detected", false);
                self.modal = Some(ActiveModal::Confirm(Confirm::new(
                    "Do you want to create a new version based on this?",
                    ModalContinuation::EditCommit { title, payload },
                )));
            }
            Err(e) => {
                warn!(error = %e, "edit aborted");
                self.set_status(&format!("Edit aborted: {e}"), true);
            }
        }
    }

    fn begin_restore(&mut self) {
        let selected = self.catalog.selected_entry();
        if selected.is_sentinel() {
            self.set_status("No secret selected", true);
            return;
        }
        let Ok(request) = RestoreRequest::for_entry(&selected) else {
            self.set_status("Cannot restore current version", true);
            return;
        };

        self.set_status("Restoring version", false);
        self.modal = Some(ActiveModal::Confirm(Confirm::new(
            "Do you want to restore this secret version?",
            ModalContinuation::RestoreCommit(request),
        )));
    }

    async fn run_continuation(&mut self, continuation: ModalContinuation, accepted: bool) {
        match continuation {
            ModalContinuation::EditCommit { title, payload } => {
                if !accepted {
                    self.set_status("Changes discarded", false);
                    return;
                }
                let Some(store) = self.store() else {
                    return;
                };
                info!(%title, "creating new version from edit");
                match store.add_secret_version(&title, &payload).await {
                    Ok(()) => {
                        self.set_status("New version created", false);
                        self.reload_detail();
                    }
                    Err(e) => {
                        error!(error = %e, "error creating new version");
                        self.set_status("Error creating new version", true);
                    }
                }
            }
            ModalContinuation::RestoreCommit(request) => {
                let outcome = match self.store.clone() {
                    Some(store) => restore::commit(store.as_ref(), &request, accepted).await,
                    None if !accepted => RestoreOutcome::Canceled,
                    None => RestoreOutcome::WriteFailed(StoreError::NotConnected.to_string()),
                };
                let (text, is_error) = outcome.status();
                self.set_status(text, is_error);
                if outcome == RestoreOutcome::Restored {
                    self.reload_detail();
                }
            }
        }
    }

    /// Fetches the selected row again, even if it is already shown.
    fn reload_detail(&mut self) {
        let entry = self.catalog.selected_entry();
        self.load_detail(&entry);
    }
}
