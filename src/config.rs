//! Persisted local settings (`config.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::CONFIG_DIR_NAME;

const CONFIG_FILE: &str = "config.toml";

/// Settings read at startup and written whenever a project is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Last selected project ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    /// Project IDs used before, offered as suggestions
    #[serde(default, alias = "projectIds")]
    pub projects: Vec<String>,
    /// Write logs to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
    /// Editor command, overriding $EDITOR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

impl AppConfig {
    /// Default location: `<config dir>/gsmedit/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE))
    }

    /// Loads the config, returning defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Records `project_id` as selected and adds it to the known projects.
    pub fn remember_project(&mut self, project_id: &str) {
        self.selected = Some(project_id.to_string());
        if !self.projects.iter().any(|p| p == project_id) {
            self.projects.push(project_id.to_string());
        }
    }
}
