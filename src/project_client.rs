//! Google Cloud Resource Manager client wrapper.
//!
//! Used only to suggest project IDs in the project selector; failures are
//! logged and otherwise ignored by the caller.

use anyhow::{Context, Result};
use google_cloud_resourcemanager_v3::client::Projects;
use tracing::debug;

/// Fetches the IDs of all projects accessible to the current user.
///
/// This uses Application Default Credentials (ADC) for authentication.
pub async fn list_project_ids() -> Result<Vec<String>> {
    let client = Projects::builder()
        .build()
        .await
        .context("Failed to create Resource Manager client")?;

    // An empty query returns all accessible projects
    let response = client
        .search_projects()
        .send()
        .await
        .context("Failed to list projects")?;

    let ids = project_ids(response.projects.into_iter().map(|p| p.project_id));
    debug!(count = ids.len(), "fetched project suggestions");
    Ok(ids)
}

/// Sorted, de-duplicated, non-empty IDs.
fn project_ids(ids: impl Iterator<Item = String>) -> Vec<String> {
    let mut ids: Vec<String> = ids.filter(|id| !id.is_empty()).collect();
    ids.sort();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_ids_are_cleaned() {
        let ids = project_ids(
            ["prod-b", "", "prod-a", "prod-b"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(ids, vec!["prod-a", "prod-b"]);
    }
}
