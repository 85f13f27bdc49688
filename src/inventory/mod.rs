//! Organization inventory: enumeration, concurrent branch fetch and output

pub mod coordinator;
pub mod encoder;
pub mod enumerator;
pub mod fetcher;
pub mod record;

use anyhow::Result;
use std::sync::Arc;

use crate::hosting::HostingClient;

pub use coordinator::{collect_snapshot, FetchOptions};
pub use encoder::{encode_snapshot, write_snapshot, EncodeOptions, OutputFormat};
pub use enumerator::enumerate_repositories;
pub use fetcher::fetch_branches;
pub use record::{FetchStatus, OrganizationSnapshot, RepositoryRecord};

/// Builds the complete snapshot of an organization
///
/// Fails only when the repository listing fails; branch fetch failures end up
/// as degraded records.
pub async fn inventory_organization(
    client: Arc<dyn HostingClient>,
    org: &str,
    options: &FetchOptions,
) -> Result<OrganizationSnapshot> {
    let stubs = enumerate_repositories(client.as_ref(), org).await?;
    collect_snapshot(client, org, stubs, options).await
}
