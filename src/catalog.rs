//! In-memory catalog of secrets and their expanded versions.
//!
//! The catalog holds the rows shown in the secrets list: one Current row per
//! secret, with the Version rows of a single secret inserted right after it
//! when expanded. Selection is an index into the rows that pass the list
//! filter.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::secret_store::{SecretInfo, VersionInfo};

/// Whether a row is a secret's head or one of its historical versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryKind {
    #[default]
    Current,
    Version,
}

/// Identifies what a row points at in the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub full_path: String,
    pub version: Option<u64>,
}

/// One row of the catalog.
///
/// The default value is the "nothing selected" sentinel (empty `full_path`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretEntry {
    /// Secret name, or the version number for version rows
    pub title: String,
    /// Resource path of the secret (the parent's path for version rows)
    pub full_path: String,
    pub kind: EntryKind,
    /// Version number, only meaningful for version rows
    pub version: u64,
    pub created_at: DateTime<Utc>,
    /// Version state label, only set for version rows
    pub state: Option<String>,
    /// The Current row this version was expanded from
    pub related: Option<Arc<SecretEntry>>,
}

impl SecretEntry {
    /// Creates a Current row from secret metadata.
    pub fn current(info: &SecretInfo) -> Self {
        Self {
            title: info.name.clone(),
            full_path: info.full_path.clone(),
            kind: EntryKind::Current,
            version: 0,
            created_at: info.create_time,
            state: None,
            related: None,
        }
    }

    /// Creates a Version row linked to `parent`.
    pub fn version_of(parent: &Arc<SecretEntry>, info: &VersionInfo) -> Self {
        Self {
            title: info.version.to_string(),
            full_path: parent.full_path.clone(),
            kind: EntryKind::Version,
            version: info.version,
            created_at: info.create_time,
            state: Some(info.state.clone()),
            related: Some(Arc::clone(parent)),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.full_path.is_empty()
    }

    pub fn is_version(&self) -> bool {
        self.kind == EntryKind::Version
    }

    pub fn key(&self) -> EntryKey {
        EntryKey {
            full_path: self.full_path.clone(),
            version: self.is_version().then_some(self.version),
        }
    }

    /// Name of the secret a new version would be written to.
    pub fn target_title(&self) -> &str {
        match &self.related {
            Some(parent) if self.is_version() => &parent.title,
            _ => &self.title,
        }
    }

    /// Text the list filter matches against.
    pub fn filter_value(&self) -> &str {
        self.target_title()
    }

    /// Scratch file name for this row, stable for a given title.
    pub fn content_hash(&self) -> String {
        let digest = Sha256::digest(self.title.as_bytes());
        format!("{digest:x}.env")
    }
}

/// Ordered rows plus selection, expansion and filter state.
#[derive(Debug, Default)]
pub struct SecretCatalog {
    entries: Vec<SecretEntry>,
    /// Index into the visible rows
    selected: usize,
    filter: String,
    filter_editing: bool,
}

impl SecretCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents with Current rows and resets selection, expansion and filter.
    pub fn populate(&mut self, entries: Vec<SecretEntry>) {
        self.entries = entries;
        self.selected = 0;
        self.filter.clear();
        self.filter_editing = false;
    }

    /// Populates from secret metadata.
    pub fn populate_from(&mut self, secrets: &[SecretInfo]) {
        self.populate(secrets.iter().map(SecretEntry::current).collect());
    }

    /// Positions of the rows passing the filter, in display order.
    fn visible(&self) -> Vec<usize> {
        if self.filter.is_empty() {
            return (0..self.entries.len()).collect();
        }
        let needle = self.filter.to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.filter_value().to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }

    /// Rows currently shown, in display order.
    pub fn visible_entries(&self) -> Vec<&SecretEntry> {
        self.visible().into_iter().map(|i| &self.entries[i]).collect()
    }

    /// All rows, ignoring the filter.
    pub fn entries(&self) -> &[SecretEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the selection among the visible rows.
    pub fn selected_index(&self) -> Option<usize> {
        (!self.visible().is_empty()).then_some(self.selected)
    }

    /// Selects a visible row, clamping to the last one.
    pub fn select(&mut self, index: usize) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        self.selected = index.min(len - 1);
    }

    /// The selected row, or the sentinel when nothing is shown.
    pub fn selected_entry(&self) -> SecretEntry {
        self.visible()
            .get(self.selected)
            .map(|&i| self.entries[i].clone())
            .unwrap_or_default()
    }

    /// Position of the selected row in the unfiltered display order.
    pub fn real_index(&self) -> usize {
        self.visible().get(self.selected).copied().unwrap_or(0)
    }

    pub fn has_versions(&self) -> bool {
        self.entries.iter().any(SecretEntry::is_version)
    }

    /// Inserts version rows right after `parent`.
    ///
    /// Returns the number of rows inserted. Nothing is inserted while any
    /// secret is already expanded, or when `parent` is not a Current row of
    /// this catalog.
    pub fn expand_versions(&mut self, parent: &SecretEntry, versions: &[VersionInfo]) -> usize {
        if self.has_versions() || parent.is_version() || parent.is_sentinel() {
            return 0;
        }
        let Some(position) = self.entries.iter().position(|e| e.key() == parent.key()) else {
            return 0;
        };

        let parent = Arc::new(self.entries[position].clone());
        let rows = versions
            .iter()
            .map(|v| SecretEntry::version_of(&parent, v));
        let tail = self.entries.split_off(position + 1);
        self.entries.extend(rows);
        let inserted = self.entries.len() - position - 1;
        self.entries.extend(tail);
        inserted
    }

    /// Removes every version row, keeping the selection on the same secret.
    pub fn collapse_versions(&mut self) -> bool {
        if !self.has_versions() {
            return false;
        }

        let selected = self.selected_entry();
        let anchor = match &selected.related {
            Some(parent) => parent.key(),
            None => selected.key(),
        };

        self.entries.retain(|e| !e.is_version());

        let position = self
            .visible()
            .iter()
            .position(|&i| self.entries[i].key() == anchor)
            .unwrap_or(0);
        self.selected = 0;
        self.select(position);
        true
    }

    // --- Navigation ---

    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        self.selected = if self.selected >= len - 1 {
            0
        } else {
            self.selected + 1
        };
    }

    pub fn select_previous(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        self.selected = if self.selected == 0 {
            len - 1
        } else {
            self.selected - 1
        };
    }

    pub fn select_first(&mut self) {
        self.select(0);
    }

    pub fn select_last(&mut self) {
        self.select(usize::MAX);
    }

    // --- List filter ---

    /// Starts editing a new filter.
    pub fn start_filter(&mut self) {
        self.filter.clear();
        self.filter_editing = true;
        self.selected = 0;
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter.push(c);
        self.selected = 0;
    }

    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
        self.selected = 0;
    }

    /// Stops editing and keeps the filter applied.
    pub fn apply_filter(&mut self) {
        self.filter_editing = false;
    }

    /// Removes the filter, keeping the selected row selected.
    pub fn clear_filter(&mut self) {
        let real = self.real_index();
        self.filter.clear();
        self.filter_editing = false;
        self.selected = 0;
        self.select(real);
    }

    pub fn is_filtering(&self) -> bool {
        self.filter_editing
    }

    pub fn is_filtered(&self) -> bool {
        !self.filter_editing && !self.filter.is_empty()
    }

    pub fn filter_query(&self) -> &str {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret_store::fake;

    fn catalog(names: &[&str]) -> SecretCatalog {
        let infos: Vec<SecretInfo> = names.iter().map(|n| fake::info(n)).collect();
        let mut catalog = SecretCatalog::new();
        catalog.populate_from(&infos);
        catalog
    }

    fn versions(name: &str, numbers: &[u64]) -> Vec<VersionInfo> {
        numbers
            .iter()
            .map(|&version| VersionInfo {
                version,
                state: "Enabled".to_string(),
                create_time: Utc::now(),
                full_path: fake::path(name),
            })
            .collect()
    }

    fn titles(catalog: &SecretCatalog) -> Vec<String> {
        catalog.entries().iter().map(|e| e.title.clone()).collect()
    }

    #[test]
    fn test_select_by_index() {
        let mut catalog = catalog(&["alpha", "beta"]);
        catalog.select(1);
        assert_eq!(catalog.selected_entry().title, "beta");
    }

    #[test]
    fn test_select_clamps_to_last_row() {
        for size in 0..5 {
            let names: Vec<String> = (0..size).map(|i| format!("s{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut catalog = catalog(&refs);

            for requested in [0, 1, 3, 7, usize::MAX] {
                catalog.select(requested);
                if size == 0 {
                    assert!(catalog.selected_entry().is_sentinel());
                    assert_eq!(catalog.selected_index(), None);
                } else {
                    let index = catalog.selected_index().unwrap();
                    assert!(index < size);
                    assert_eq!(index, requested.min(size - 1));
                }
            }
        }
    }

    #[test]
    fn test_empty_catalog_returns_sentinel() {
        let catalog = SecretCatalog::new();
        let entry = catalog.selected_entry();
        assert!(entry.is_sentinel());
        assert_eq!(entry.full_path, "");
    }

    #[test]
    fn test_expand_inserts_after_parent() {
        let mut catalog = catalog(&["alpha", "beta"]);
        let parent = catalog.selected_entry();

        let inserted = catalog.expand_versions(&parent, &versions("alpha", &[2, 3]));

        assert_eq!(inserted, 2);
        assert_eq!(catalog.len(), 4);
        assert_eq!(titles(&catalog), ["alpha", "2", "3", "beta"]);
        for row in &catalog.entries()[1..3] {
            assert!(row.is_version());
            assert_eq!(row.related.as_ref().unwrap().title, "alpha");
            assert_eq!(row.full_path, fake::path("alpha"));
        }
        assert_eq!(catalog.selected_entry().title, "alpha");
    }

    #[test]
    fn test_expand_twice_is_noop() {
        let mut catalog = catalog(&["alpha", "beta"]);
        let parent = catalog.selected_entry();

        assert_eq!(catalog.expand_versions(&parent, &versions("alpha", &[2, 3])), 2);
        assert_eq!(catalog.expand_versions(&parent, &versions("alpha", &[2, 3])), 0);
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_only_one_secret_expanded() {
        let mut catalog = catalog(&["alpha", "beta"]);
        let alpha = catalog.selected_entry();
        catalog.expand_versions(&alpha, &versions("alpha", &[1]));

        catalog.select(2);
        let beta = catalog.selected_entry();
        assert_eq!(beta.title, "beta");
        assert_eq!(catalog.expand_versions(&beta, &versions("beta", &[1])), 0);
    }

    #[test]
    fn test_expand_rejects_version_row() {
        let mut catalog = catalog(&["alpha"]);
        let alpha = catalog.selected_entry();
        catalog.expand_versions(&alpha, &versions("alpha", &[2]));
        catalog.collapse_versions();

        let parent = Arc::new(alpha);
        let row = SecretEntry::version_of(&parent, &versions("alpha", &[2])[0]);
        assert_eq!(catalog.expand_versions(&row, &versions("alpha", &[2])), 0);
    }

    #[test]
    fn test_collapse_restores_base_catalog() {
        let mut catalog = catalog(&["alpha", "beta", "gamma"]);
        catalog.select(1);
        let before: Vec<SecretEntry> = catalog.entries().to_vec();

        let parent = catalog.selected_entry();
        catalog.expand_versions(&parent, &versions("beta", &[4, 3, 2]));
        assert!(catalog.collapse_versions());

        assert_eq!(catalog.entries(), before.as_slice());
        assert!(!catalog.collapse_versions());
    }

    #[test]
    fn test_collapse_moves_selection_to_parent() {
        let mut catalog = catalog(&["alpha", "beta"]);
        let alpha = catalog.selected_entry();
        catalog.expand_versions(&alpha, &versions("alpha", &[3, 2]));

        catalog.select(2);
        assert!(catalog.selected_entry().is_version());

        catalog.collapse_versions();
        assert_eq!(catalog.selected_entry().title, "alpha");
    }

    #[test]
    fn test_collapse_keeps_selection_on_other_secret() {
        let mut catalog = catalog(&["alpha", "beta"]);
        let alpha = catalog.selected_entry();
        catalog.expand_versions(&alpha, &versions("alpha", &[3, 2]));
        catalog.select_last();
        assert_eq!(catalog.selected_entry().title, "beta");

        catalog.collapse_versions();
        assert_eq!(catalog.selected_entry().title, "beta");
        assert_eq!(catalog.selected_index(), Some(1));
    }

    #[test]
    fn test_populate_clears_expansion() {
        let mut catalog = catalog(&["alpha"]);
        let alpha = catalog.selected_entry();
        catalog.expand_versions(&alpha, &versions("alpha", &[2]));

        catalog.populate_from(&[fake::info("alpha"), fake::info("beta")]);
        assert!(!catalog.has_versions());
        assert_eq!(catalog.selected_index(), Some(0));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut catalog = catalog(&["a", "b", "c"]);
        catalog.select_previous();
        assert_eq!(catalog.selected_entry().title, "c");
        catalog.select_next();
        assert_eq!(catalog.selected_entry().title, "a");
        catalog.select_last();
        assert_eq!(catalog.selected_entry().title, "c");
        catalog.select_first();
        assert_eq!(catalog.selected_entry().title, "a");
    }

    #[test]
    fn test_filter_maps_back_to_real_index() {
        let mut catalog = catalog(&["alpha", "beta", "gamma", "betamax"]);
        catalog.start_filter();
        for c in "BETA".chars() {
            catalog.push_filter_char(c);
        }
        catalog.apply_filter();

        assert!(catalog.is_filtered());
        assert_eq!(catalog.visible_entries().len(), 2);
        catalog.select(1);
        assert_eq!(catalog.selected_entry().title, "betamax");
        assert_eq!(catalog.real_index(), 3);

        catalog.clear_filter();
        assert_eq!(catalog.selected_entry().title, "betamax");
        assert_eq!(catalog.selected_index(), Some(3));
    }

    #[test]
    fn test_filter_keeps_version_rows_with_parent() {
        let mut catalog = catalog(&["alpha", "beta"]);
        catalog.select(1);
        let beta = catalog.selected_entry();
        catalog.expand_versions(&beta, &versions("beta", &[2]));

        catalog.start_filter();
        catalog.push_filter_char('b');
        let shown: Vec<&str> = catalog
            .visible_entries()
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(shown, ["beta", "2"]);
    }

    #[test]
    fn test_filter_with_no_match_yields_sentinel() {
        let mut catalog = catalog(&["alpha"]);
        catalog.start_filter();
        catalog.push_filter_char('z');
        assert!(catalog.selected_entry().is_sentinel());
        catalog.pop_filter_char();
        assert_eq!(catalog.selected_entry().title, "alpha");
    }

    #[test]
    fn test_content_hash_is_stable_per_title() {
        let a = SecretEntry::current(&fake::info("alpha"));
        let b = SecretEntry::current(&fake::info("alpha"));
        let c = SecretEntry::current(&fake::info("beta"));

        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
        assert!(a.content_hash().ends_with(".env"));
        assert_eq!(a.content_hash().len(), 64 + 4);
    }

    #[test]
    fn test_target_title_uses_parent_for_versions() {
        let parent = Arc::new(SecretEntry::current(&fake::info("alpha")));
        let row = SecretEntry::version_of(&parent, &versions("alpha", &[2])[0]);
        assert_eq!(row.title, "2");
        assert_eq!(row.target_title(), "alpha");
        assert_eq!(parent.target_title(), "alpha");
    }
}
