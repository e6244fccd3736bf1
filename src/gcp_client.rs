//! Google Cloud Secret Manager client wrapper.
//!
//! This module implements [`SecretStore`] on top of the official Google
//! Cloud Rust SDK.

use std::future::Future;
use std::sync::RwLock;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use google_cloud_secretmanager_v1::client::SecretManagerService;
use google_cloud_secretmanager_v1::model::{Secret, SecretPayload, SecretVersion};
use tracing::{debug, info, warn};

use crate::secret_store::{SecretInfo, SecretStore, StoreError, StoreResult, VersionInfo};

/// Secret store backed by Google Cloud Secret Manager.
pub struct GcpSecretStore {
    /// The underlying Google Cloud client
    client: SecretManagerService,
    /// The Google Cloud project ID
    project_id: String,
    /// Metadata from the last listing, used to answer info requests
    listed: RwLock<Vec<SecretInfo>>,
}

impl GcpSecretStore {
    /// Creates a new Secret Manager client for the given project.
    ///
    /// This will use Application Default Credentials (ADC) for authentication.
    /// Make sure you have run: gcloud auth application-default login
    pub async fn connect(project_id: &str) -> Result<Self> {
        let client = SecretManagerService::builder()
            .build()
            .await
            .context("Failed to create Secret Manager client. Make sure you have authenticated with: gcloud auth application-default login")?;

        info!(project_id, "connected to Secret Manager");
        Ok(Self {
            client,
            project_id: project_id.to_string(),
            listed: RwLock::new(Vec::new()),
        })
    }

    /// Returns the parent path for API calls.
    fn parent(&self) -> String {
        format!("projects/{}", self.project_id)
    }

    /// Returns the full path for a secret.
    fn secret_path(&self, secret_name: &str) -> String {
        format!("projects/{}/secrets/{}", self.project_id, secret_name)
    }

    /// Accesses a version by resource name and validates its checksum.
    async fn access(&self, name: String) -> StoreResult<Vec<u8>> {
        debug!(%name, "accessing secret version");
        let response = self
            .client
            .access_secret_version()
            .set_name(&name)
            .send()
            .await
            .map_err(|e| StoreError::api("access secret version", e))?;

        let payload = response.payload.ok_or(StoreError::MissingPayload)?;
        let data = payload.data.to_vec();
        match payload.data_crc32c {
            Some(expected) => verify_checksum(&data, expected)?,
            None => warn!(%name, "payload carries no checksum"),
        }
        Ok(data)
    }
}

#[async_trait]
impl SecretStore for GcpSecretStore {
    async fn list_secrets(&self) -> StoreResult<Vec<SecretInfo>> {
        let secrets = collect_pages(|page_token| async move {
            let response = self
                .client
                .list_secrets()
                .set_parent(self.parent())
                .set_page_token(page_token)
                .send()
                .await
                .map_err(|e| StoreError::api("list secrets", e))?;
            let page: Vec<SecretInfo> = response.secrets.iter().map(secret_to_info).collect();
            StoreResult::Ok((page, response.next_page_token))
        })
        .await?;

        info!(count = secrets.len(), "listed secrets");
        if let Ok(mut listed) = self.listed.write() {
            *listed = secrets.clone();
        }
        Ok(secrets)
    }

    async fn get_secret(&self, full_path: &str) -> StoreResult<Vec<u8>> {
        self.access(format!("{full_path}/versions/latest")).await
    }

    async fn get_secret_version(&self, full_path: &str, version: u64) -> StoreResult<Vec<u8>> {
        self.access(format!("{full_path}/versions/{version}")).await
    }

    async fn list_versions(&self, full_path: &str) -> StoreResult<Vec<VersionInfo>> {
        let versions = collect_pages(|page_token| async move {
            let response = self
                .client
                .list_secret_versions()
                .set_parent(full_path)
                .set_page_token(page_token)
                .send()
                .await
                .map_err(|e| StoreError::api("list versions", e))?;
            let page: Vec<VersionInfo> = response
                .versions
                .iter()
                .map(|v| version_to_info(full_path, v))
                .collect();
            StoreResult::Ok((page, response.next_page_token))
        })
        .await?;

        debug!(path = %full_path, count = versions.len(), "listed secret versions");
        Ok(versions)
    }

    async fn add_secret_version(&self, name: &str, payload: &[u8]) -> StoreResult<()> {
        let parent = self.secret_path(name);
        let checksum = i64::from(crc32c::crc32c(payload));

        let payload = SecretPayload::default()
            .set_data(payload.to_vec())
            .set_data_crc32c(checksum);

        let version = self
            .client
            .add_secret_version()
            .set_parent(&parent)
            .set_payload(payload)
            .send()
            .await
            .map_err(|e| StoreError::api("add secret version", e))?;

        info!(version = %version.name, "added secret version");
        Ok(())
    }

    async fn search_by_content(&self, query: &str) -> StoreResult<Vec<SecretInfo>> {
        let secrets = self.list_secrets().await?;

        // One request per secret, joined before returning.
        let payloads = join_all(secrets.iter().map(|s| self.get_secret(&s.full_path))).await;

        let found: Vec<SecretInfo> = secrets
            .into_iter()
            .zip(payloads)
            .filter_map(|(secret, payload)| match payload {
                Ok(data) if String::from_utf8_lossy(&data).contains(query) => Some(secret),
                Ok(_) => None,
                Err(e) => {
                    warn!(secret = %secret.full_path, error = %e, "failed to get secret during search");
                    None
                }
            })
            .collect();

        info!(query, matches = found.len(), "content search finished");
        Ok(found)
    }

    async fn get_secret_info(&self, full_path: &str) -> StoreResult<SecretInfo> {
        if let Ok(listed) = self.listed.read() {
            if let Some(info) = listed.iter().find(|s| s.full_path == full_path) {
                return Ok(info.clone());
            }
        }

        let secret = self
            .client
            .get_secret()
            .set_name(full_path)
            .send()
            .await
            .map_err(|e| StoreError::api("get secret info", e))?;

        Ok(secret_to_info(&secret))
    }
}

// --- Helper functions ---

/// Compares the CRC32C of `data` with the checksum reported by the backend.
fn verify_checksum(data: &[u8], expected: i64) -> StoreResult<()> {
    let actual = i64::from(crc32c::crc32c(data));
    if actual != expected {
        return Err(StoreError::DataCorruption { expected, actual });
    }
    Ok(())
}

/// Converts a protobuf timestamp to a UTC date time.
fn to_datetime(seconds: i64, nanos: i32) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(seconds, u32::try_from(nanos).unwrap_or(0)).unwrap_or_default()
}

/// Converts a Secret proto to our SecretInfo struct.
fn secret_to_info(secret: &Secret) -> SecretInfo {
    let full_path = secret.name.clone();
    let name = full_path
        .rsplit('/')
        .next()
        .unwrap_or(&full_path)
        .to_string();

    let create_time = secret
        .create_time
        .as_ref()
        .map(|t| to_datetime(t.seconds(), t.nanos()))
        .unwrap_or_default();

    SecretInfo {
        name,
        full_path,
        create_time,
        labels: secret.labels.clone().into_iter().collect(),
        annotations: secret.annotations.clone().into_iter().collect(),
    }
}

/// Converts a SecretVersion proto to our VersionInfo struct.
fn version_to_info(full_path: &str, version: &SecretVersion) -> VersionInfo {
    // Extract version number from name (e.g., ".../versions/1" -> 1)
    let number = version
        .name
        .rsplit('/')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);

    let create_time = version
        .create_time
        .as_ref()
        .map(|t| to_datetime(t.seconds(), t.nanos()))
        .unwrap_or_default();

    VersionInfo {
        version: number,
        state: state_label(&format!("{:?}", version.state)),
        create_time,
        full_path: full_path.to_string(),
    }
}

/// Normalizes a debug-formatted version state (e.g., "State::Enabled").
fn state_label(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if lower.contains("disabled") {
        "Disabled".to_string()
    } else if lower.contains("destroyed") {
        "Destroyed".to_string()
    } else if lower.contains("enabled") {
        "Enabled".to_string()
    } else {
        raw.to_string()
    }
}

/// Drains a paged listing, following `next_page_token` until it comes back empty.
async fn collect_pages<T, F, Fut>(mut fetch: F) -> StoreResult<Vec<T>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = StoreResult<(Vec<T>, String)>>,
{
    let mut items = Vec::new();
    let mut page_token = String::new();
    loop {
        let (page, next) = fetch(page_token).await?;
        items.extend(page);
        if next.is_empty() {
            return Ok(items);
        }
        page_token = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_accepts_matching_payload() {
        let data = b"API_KEY=abc";
        let expected = i64::from(crc32c::crc32c(data));
        assert!(verify_checksum(data, expected).is_ok());
    }

    #[test]
    fn test_checksum_mismatch_is_corruption() {
        let err = verify_checksum(b"API_KEY=abc", 42).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_state_label_normalizes_debug_output() {
        assert_eq!(state_label("State::Enabled"), "Enabled");
        assert_eq!(state_label("Disabled"), "Disabled");
        assert_eq!(state_label("DESTROYED"), "Destroyed");
        assert_eq!(state_label("Unspecified"), "Unspecified");
    }

    #[test]
    fn test_timestamp_conversion() {
        let dt = to_datetime(1_700_000_000, 0);
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2023-11-14");
        assert_eq!(to_datetime(1_700_000_000, -5).timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_collect_pages_follows_every_token() {
        let mut requested = Vec::new();
        let versions = collect_pages(|token| {
            requested.push(token.clone());
            let page = match token.as_str() {
                "" => (vec![7, 6, 5], "page-2".to_string()),
                "page-2" => (vec![4, 3], "page-3".to_string()),
                _ => (vec![2, 1], String::new()),
            };
            async move { StoreResult::Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(versions, vec![7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(requested, vec!["", "page-2", "page-3"]);
    }

    #[tokio::test]
    async fn test_collect_pages_stops_on_error() {
        let result: StoreResult<Vec<u64>> = collect_pages(|token| async move {
            if token.is_empty() {
                Ok((vec![2], "next".to_string()))
            } else {
                Err(StoreError::api("list versions", "quota exceeded"))
            }
        })
        .await;
        assert!(result.is_err());
    }
}
