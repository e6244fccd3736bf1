//! Secret store abstraction.
//!
//! The interaction engine talks to the backend only through [`SecretStore`],
//! so the Google Cloud client can be swapped for the recording fake in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Metadata about a secret, independent of its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretInfo {
    /// Short name (e.g., "my-secret")
    pub name: String,
    /// Full resource name (e.g., "projects/my-project/secrets/my-secret")
    pub full_path: String,
    /// Creation time of the secret
    pub create_time: DateTime<Utc>,
    /// Labels on the secret
    pub labels: HashMap<String, String>,
    /// Annotations on the secret
    pub annotations: HashMap<String, String>,
}

/// Information about one version of a secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Version number
    pub version: u64,
    /// State label as reported by the API (e.g., "Enabled")
    pub state: String,
    /// Creation time of the version
    pub create_time: DateTime<Utc>,
    /// Full resource name of the owning secret
    pub full_path: String,
}

/// Errors reported by a [`SecretStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected or failed the request.
    #[error("{operation} failed: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },

    /// The payload checksum did not match the one sent by the backend.
    #[error("data corruption detected: expected crc32c of {expected} but got {actual}")]
    DataCorruption { expected: i64, actual: i64 },

    /// The backend answered without a payload.
    #[error("secret version has no payload")]
    MissingPayload,

    /// No project has been selected yet.
    #[error("not connected to a project")]
    NotConnected,
}

impl StoreError {
    pub fn api(operation: &'static str, err: impl std::fmt::Display) -> Self {
        StoreError::Api {
            operation,
            message: err.to_string(),
        }
    }

    /// Returns true for integrity failures, which are reported apart from I/O errors.
    pub fn is_corruption(&self) -> bool {
        matches!(self, StoreError::DataCorruption { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend capability for secret CRUD and search.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Lists all secrets in the project.
    async fn list_secrets(&self) -> StoreResult<Vec<SecretInfo>>;

    /// Returns the payload of the latest version.
    async fn get_secret(&self, full_path: &str) -> StoreResult<Vec<u8>>;

    /// Returns the payload of a specific version, validating its checksum.
    async fn get_secret_version(&self, full_path: &str, version: u64) -> StoreResult<Vec<u8>>;

    /// Lists the versions of a secret.
    async fn list_versions(&self, full_path: &str) -> StoreResult<Vec<VersionInfo>>;

    /// Adds a new version to the secret with the given short name.
    async fn add_secret_version(&self, name: &str, payload: &[u8]) -> StoreResult<()>;

    /// Returns the secrets whose latest payload contains `query`.
    async fn search_by_content(&self, query: &str) -> StoreResult<Vec<SecretInfo>>;

    /// Returns metadata for a single secret.
    async fn get_secret_info(&self, full_path: &str) -> StoreResult<SecretInfo>;
}
