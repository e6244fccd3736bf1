//! Google Cloud Secret Manager editor
//!
//! A terminal user interface for browsing, editing and versioning Google
//! Cloud secrets.
//! Run with: gsmedit [-p|--project <PROJECT_ID>]

mod app;
mod catalog;
mod config;
mod constants;
mod detail;
mod edit;
mod event;
mod gcp_client;
mod modal;
mod project_client;
mod restore;
mod secret_store;
mod ui;
mod validation;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::app::{App, AppContext, AppEvent, Flow};
use crate::config::AppConfig;
use crate::edit::ExternalEditor;
use crate::event::EventHandler;
use crate::gcp_client::GcpSecretStore;

/// Browse, edit and version Google Cloud secrets from the terminal.
///
/// Make sure you have authenticated with:
///   gcloud auth application-default login
#[derive(Debug, Parser)]
#[command(name = "gsmedit", version, about)]
struct Args {
    /// Start with the specified GCP project
    #[arg(short, long, value_name = "PROJECT_ID", value_parser = parse_project_id)]
    project: Option<String>,

    /// Write logs to this file (overrides the config file)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Editor command used to edit payloads (overrides $EDITOR)
    #[arg(long, value_name = "CMD")]
    editor: Option<String>,
}

fn parse_project_id(value: &str) -> Result<String, String> {
    validation::validate_project_id(value)?;
    Ok(value.to_string())
}

/// Sends tracing output to `path`; the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .init();
    Ok(())
}

/// Things the main loop needs besides the app itself.
struct Session {
    config: AppConfig,
    config_path: Option<PathBuf>,
    editor: ExternalEditor,
}

impl Session {
    /// Connects to `project_id` and persists it once its secrets load.
    async fn switch_project(&mut self, app: &mut App, project_id: String) {
        let store = match GcpSecretStore::connect(&project_id).await {
            Ok(store) => store,
            Err(e) => {
                error!(project = %project_id, error = %e, "could not connect");
                app.connection_failed(&project_id);
                return;
            }
        };

        let context = AppContext {
            project_id: project_id.clone(),
        };
        if !app.attach(context, Arc::new(store)).await {
            return;
        }

        self.config.remember_project(&project_id);
        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save_to(path) {
                warn!(error = %e, "could not save config");
            }
        }
    }
}

/// Loads project suggestions in the background.
fn spawn_project_suggestions(tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        match project_client::list_project_ids().await {
            Ok(ids) => {
                let _ = tx.send(AppEvent::ProjectsLoaded(ids));
            }
            Err(e) => warn!(error = %e, "project suggestions unavailable"),
        }
    });
}

/// Entry point for the application.
///
/// Starts with the project from -p/--project or the config file; without
/// either, the project selector opens first.
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = AppConfig::default_path();
    let config = match &config_path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::default(),
    };

    if let Some(path) = args.log_file.as_ref().or(config.log_path.as_ref()) {
        init_logging(path)?;
    }
    info!("starting gsmedit");

    let editor = ExternalEditor::resolve(args.editor.as_deref().or(config.editor.as_deref()));
    let initial_project = args.project.clone().or_else(|| config.selected.clone());
    let session = Session {
        config,
        config_path,
        editor,
    };

    // Initialize the terminal
    let terminal = ratatui::init();

    let result = run_app(terminal, session, initial_project).await;

    // Restore the terminal to its original state
    ratatui::restore();

    result
}

/// Main application loop.
///
/// 1. Draw the current UI state
/// 2. Handle user input events
/// 3. Fold in background results
/// 4. Repeat until the user quits
async fn run_app(
    mut terminal: ratatui::DefaultTerminal,
    mut session: Session,
    initial_project: Option<String>,
) -> Result<()> {
    // Owner-only directory for editor scratch files, removed on exit
    let scratch_dir = tempfile::Builder::new()
        .prefix("gsmedit-")
        .tempdir()
        .context("Failed to create scratch directory")?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(
        session.config.projects.clone(),
        scratch_dir.path().to_path_buf(),
        tx.clone(),
    );

    spawn_project_suggestions(tx);

    match initial_project {
        Some(project_id) => session.switch_project(&mut app, project_id).await,
        None => app.open_project_selector(None),
    }

    let event_handler = EventHandler::new();

    loop {
        app.expire_status();

        terminal
            .draw(|frame| ui::draw(frame, &app))
            .context("Failed to draw UI")?;

        // Text entry reads keys as characters
        let event = if app.takes_text() {
            event_handler.next_input()?
        } else {
            event_handler.next()?
        };

        if let Some(action) = event {
            match app.handle_event(action).await {
                Flow::Continue => {}
                Flow::Quit => break,
                Flow::Edit(edit) => {
                    ratatui::restore();
                    let result = edit.run(&session.editor).await;
                    terminal = ratatui::init();
                    app.finish_edit(result);
                }
                Flow::SwitchProject(project_id) => {
                    session.switch_project(&mut app, project_id).await;
                }
            }
        }

        while let Ok(event) = rx.try_recv() {
            app.handle_background(event);
        }
    }

    info!("exiting");
    Ok(())
}
