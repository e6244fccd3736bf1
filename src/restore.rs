//! Restoring a historical version as the new latest version.

use tracing::{error, info};

use crate::catalog::SecretEntry;
use crate::secret_store::SecretStore;

/// What a confirmed restore writes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreRequest {
    /// Resource path of the secret owning the version
    pub full_path: String,
    /// Short name of the secret the new version is added to
    pub title: String,
    pub version: u64,
}

/// Restore was attempted on a row that is already the latest version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CannotRestoreCurrent;

impl RestoreRequest {
    /// Builds a request for a Version row; Current rows are rejected.
    pub fn for_entry(entry: &SecretEntry) -> Result<Self, CannotRestoreCurrent> {
        match &entry.related {
            Some(parent) if entry.is_version() => Ok(Self {
                full_path: parent.full_path.clone(),
                title: parent.title.clone(),
                version: entry.version,
            }),
            _ => Err(CannotRestoreCurrent),
        }
    }
}

/// How a restore ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    Canceled,
    /// Reading the old version failed
    FetchFailed(String),
    /// The old version failed its integrity check
    Corrupted(String),
    /// Writing the new version failed
    WriteFailed(String),
}

impl RestoreOutcome {
    /// Status bar text and whether it is an error.
    pub fn status(&self) -> (&'static str, bool) {
        match self {
            RestoreOutcome::Restored => ("Secret restored", false),
            RestoreOutcome::Canceled => ("Restore canceled", false),
            RestoreOutcome::FetchFailed(_) => ("Error getting secret version", true),
            RestoreOutcome::Corrupted(_) => ("Secret version failed its integrity check", true),
            RestoreOutcome::WriteFailed(_) => ("Error restoring secret", true),
        }
    }
}

/// Resolves a restore confirmation.
///
/// Nothing touches the store unless `confirmed` is true.
pub async fn commit(store: &dyn SecretStore, request: &RestoreRequest, confirmed: bool) -> RestoreOutcome {
    if !confirmed {
        return RestoreOutcome::Canceled;
    }

    info!(title = %request.title, version = request.version, "restoring secret version");
    let payload = match store
        .get_secret_version(&request.full_path, request.version)
        .await
    {
        Ok(payload) => payload,
        Err(e) if e.is_corruption() => {
            error!(error = %e, "restore source is corrupted");
            return RestoreOutcome::Corrupted(e.to_string());
        }
        Err(e) => {
            error!(error = %e, "error getting secret version for restore");
            return RestoreOutcome::FetchFailed(e.to_string());
        }
    };

    match store.add_secret_version(&request.title, &payload).await {
        Ok(()) => RestoreOutcome::Restored,
        Err(e) => {
            error!(error = %e, "error creating restored version");
            RestoreOutcome::WriteFailed(e.to_string())
        }
    }
}
