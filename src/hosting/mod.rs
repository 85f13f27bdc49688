//! Hosting service clients
//!
//! The inventory talks to the hosting service only through [`HostingClient`],
//! so the fan-out can run against GitHub, GitHub Enterprise or a test double.

pub mod github;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use std::time::Duration;

use crate::core::Credentials;

pub use github::GitHubClient;

/// Minimal identifying data for a repository, as returned by the listing call
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RepositoryStub {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub git_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub clone_url: String,
}

// Enterprise instances report `null` for protocols they have disabled.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Trait for hosting services to implement
///
/// Implementations are shared read-only across every concurrent fetch.
#[async_trait]
pub trait HostingClient: Send + Sync {
    /// Lists every repository of the organization, following all pages
    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepositoryStub>>;

    /// Lists the branch names of one repository in provider order, following all pages
    async fn list_branches(&self, org: &str, repo: &str) -> Result<Vec<String>>;
}

/// Builds the authenticated client for a run
///
/// Uses the enterprise endpoint when `credentials.base_url` is set, the
/// public service otherwise.
pub fn build_client(
    credentials: &Credentials,
    request_timeout: Duration,
) -> Result<Arc<dyn HostingClient>> {
    let client = match credentials.base_url.as_deref() {
        Some(base_url) => GitHubClient::with_enterprise(&credentials.token, base_url, request_timeout)
            .with_context(|| format!("failed to create enterprise client for '{base_url}'"))?,
        None => GitHubClient::new(&credentials.token, request_timeout)
            .context("failed to create GitHub client")?,
    };
    tracing::debug!(api = %client.api_url(), "hosting client ready");
    Ok(Arc::new(client))
}
