//! External editor round trip for a secret payload.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::catalog::SecretEntry;

/// Something that lets the user edit a file in place.
#[async_trait]
pub trait Editor: Send + Sync {
    /// Blocks until the user is done editing `path`.
    async fn edit(&self, path: &Path) -> Result<()>;
}

/// Runs the user's editor as a child process.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    /// Picks the configured editor, then `$EDITOR`, then vim.
    pub fn resolve(configured: Option<&str>) -> Self {
        Self {
            command: pick_command(configured, std::env::var("EDITOR").ok()),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

/// First non-blank of the configured command and `$EDITOR`, else vim.
fn pick_command(configured: Option<&str>, env_editor: Option<String>) -> String {
    configured
        .map(str::to_string)
        .filter(|c| !c.trim().is_empty())
        .or_else(|| env_editor.filter(|c| !c.trim().is_empty()))
        .unwrap_or_else(|| "vim".to_string())
}

#[async_trait]
impl Editor for ExternalEditor {
    async fn edit(&self, path: &Path) -> Result<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().context("Editor command is empty")?;

        let status = tokio::process::Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .await
            .with_context(|| format!("Failed to launch editor '{program}'"))?;

        if !status.success() {
            bail!("Editor '{program}' exited with {status}");
        }
        Ok(())
    }
}

/// Scratch file that is removed when dropped.
#[derive(Debug)]
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    fn create(path: PathBuf, contents: &[u8]) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        // Never reuse or follow an existing path
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&path)?;
        // Guarded from here on so a failed write still cleans up
        let scratch = Self { path };
        file.write_all(contents)?;
        file.flush()?;
        Ok(scratch)
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove scratch file");
            }
        }
    }
}

/// Result of an edit round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The file came back byte-identical
    Unchanged,
    /// The file changed; `title` is the secret a new version would go to
    Changed { title: String, payload: Vec<u8> },
}

/// One payload handed to the editor.
#[derive(Debug)]
pub struct EditSession {
    title: String,
    original: Vec<u8>,
    scratch: ScratchFile,
}

impl EditSession {
    /// Writes `payload` to a scratch file named after the entry in `dir`.
    pub fn begin(entry: &SecretEntry, payload: Vec<u8>, dir: &Path) -> Result<Self> {
        let path = dir.join(entry.content_hash());
        let scratch = ScratchFile::create(path, &payload)
            .context("Failed to create temporary file")?;

        Ok(Self {
            title: entry.target_title().to_string(),
            original: payload,
            scratch,
        })
    }

    pub fn path(&self) -> &Path {
        &self.scratch.path
    }

    /// Secret the edited payload would be written to.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Hands the scratch file to `editor` and compares what comes back.
    ///
    /// The scratch file is removed on every path out of this function.
    pub async fn run(self, editor: &dyn Editor) -> Result<EditOutcome> {
        editor.edit(self.path()).await?;

        let edited = tokio::fs::read(self.path())
            .await
            .context("Failed to read edited file")?;

        let EditSession {
            title,
            original,
            scratch,
        } = self;
        drop(scratch);

        if edited == original {
            info!(%title, "no changes detected");
            Ok(EditOutcome::Unchanged)
        } else {
            info!(%title, "changes detected");
            Ok(EditOutcome::Changed {
                title,
                payload: edited,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::secret_store::{fake, VersionInfo};

    /// Editor that optionally rewrites the file and remembers the path.
    struct ScriptedEditor {
        write: Option<&'static str>,
        fail: bool,
        seen: Mutex<Option<(PathBuf, Vec<u8>)>>,
    }

    impl ScriptedEditor {
        fn new(write: Option<&'static str>) -> Self {
            Self {
                write,
                fail: false,
                seen: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                write: None,
                fail: true,
                seen: Mutex::new(None),
            }
        }

        fn seen(&self) -> (PathBuf, Vec<u8>) {
            self.seen.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait]
    impl Editor for ScriptedEditor {
        async fn edit(&self, path: &Path) -> Result<()> {
            *self.seen.lock().unwrap() = Some((path.to_path_buf(), fs::read(path)?));
            if self.fail {
                bail!("editor crashed");
            }
            if let Some(content) = self.write {
                fs::write(path, content)?;
            }
            Ok(())
        }
    }

    fn entry(name: &str) -> SecretEntry {
        SecretEntry::current(&fake::info(name))
    }

    #[tokio::test]
    async fn test_unchanged_payload() {
        let dir = tempfile::tempdir().unwrap();
        let editor = ScriptedEditor::new(None);

        let session = EditSession::begin(&entry("alpha"), b"A=1".to_vec(), dir.path()).unwrap();
        let outcome = session.run(&editor).await.unwrap();

        assert_eq!(outcome, EditOutcome::Unchanged);
        let (path, seen) = editor.seen();
        assert_eq!(seen, b"A=1");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_identical_rewrite_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let editor = ScriptedEditor::new(Some("A=1"));

        let session = EditSession::begin(&entry("alpha"), b"A=1".to_vec(), dir.path()).unwrap();
        assert_eq!(session.run(&editor).await.unwrap(), EditOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_changed_payload() {
        let dir = tempfile::tempdir().unwrap();
        let editor = ScriptedEditor::new(Some("A=2"));

        let session = EditSession::begin(&entry("alpha"), b"A=1".to_vec(), dir.path()).unwrap();
        let outcome = session.run(&editor).await.unwrap();

        assert_eq!(
            outcome,
            EditOutcome::Changed {
                title: "alpha".to_string(),
                payload: b"A=2".to_vec(),
            }
        );
        assert!(!editor.seen().0.exists());
    }

    #[tokio::test]
    async fn test_version_row_targets_parent() {
        let dir = tempfile::tempdir().unwrap();
        let parent = Arc::new(entry("alpha"));
        let row = SecretEntry::version_of(
            &parent,
            &VersionInfo {
                version: 2,
                state: "Enabled".to_string(),
                create_time: chrono::Utc::now(),
                full_path: fake::path("alpha"),
            },
        );
        let editor = ScriptedEditor::new(Some("A=old-edited"));

        let session = EditSession::begin(&row, b"A=old".to_vec(), dir.path()).unwrap();
        assert_eq!(session.title(), "alpha");
        let EditOutcome::Changed { title, .. } = session.run(&editor).await.unwrap() else {
            panic!("expected changes");
        };
        assert_eq!(title, "alpha");
    }

    #[tokio::test]
    async fn test_editor_failure_still_removes_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let editor = ScriptedEditor::failing();

        let session = EditSession::begin(&entry("alpha"), b"A=1".to_vec(), dir.path()).unwrap();
        let path = session.path().to_path_buf();
        assert!(path.exists());

        assert!(session.run(&editor).await.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_name_is_derived_from_entry() {
        let dir = tempfile::tempdir().unwrap();
        let alpha = entry("alpha");

        let first = EditSession::begin(&alpha, b"x".to_vec(), dir.path()).unwrap();
        assert_eq!(first.path(), dir.path().join(alpha.content_hash()));
        let beta = EditSession::begin(&entry("beta"), b"y".to_vec(), dir.path()).unwrap();
        assert_ne!(first.path(), beta.path());

        drop(first);
        drop(beta);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_scratch_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let session = EditSession::begin(&entry("alpha"), b"x".to_vec(), dir.path()).unwrap();
        let mode = fs::metadata(session.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_resolve_prefers_configured_editor() {
        assert_eq!(ExternalEditor::resolve(Some("nano -w")).command(), "nano -w");
    }

    #[test]
    fn test_blank_configured_editor_falls_back_to_env() {
        assert_eq!(pick_command(Some("  "), Some("nano".to_string())), "nano");
        assert_eq!(pick_command(Some(""), Some(" ".to_string())), "vim");
        assert_eq!(pick_command(None, None), "vim");
        assert_eq!(pick_command(Some("code -w"), Some("nano".to_string())), "code -w");
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_symlink_is_not_written_through() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("elsewhere");
        fs::write(&target, b"untouched").unwrap();

        let alpha = entry("alpha");
        let planted = dir.path().join(alpha.content_hash());
        std::os::unix::fs::symlink(&target, &planted).unwrap();

        assert!(EditSession::begin(&alpha, b"SECRET=1".to_vec(), dir.path()).is_err());
        assert_eq!(fs::read(&target).unwrap(), b"untouched");
        // A refused path is left alone, not cleaned up as ours
        assert!(fs::symlink_metadata(&planted).is_ok());
    }
}
