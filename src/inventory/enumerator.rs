//! Repository enumeration

use anyhow::{Context, Result};
use tracing::info;

use crate::hosting::{HostingClient, RepositoryStub};

/// Lists every repository stub of the organization
///
/// Any error here is fatal to the run: no branch fetch has started yet, and a
/// partial repository list would be silently incomplete.
pub async fn enumerate_repositories(
    client: &dyn HostingClient,
    org: &str,
) -> Result<Vec<RepositoryStub>> {
    let stubs = client
        .list_org_repos(org)
        .await
        .with_context(|| format!("failed to list repositories for organization '{org}'"))?;

    info!(org, count = stubs.len(), "enumerated repositories");
    Ok(stubs)
}
