//! Per-repository branch fetch

use tracing::{debug, warn};

use super::RepositoryRecord;
use crate::hosting::{HostingClient, RepositoryStub};

/// Fetches the branch names of one repository
///
/// Never fails: a listing error is logged and turns into a degraded record
/// with no branches, so one repository cannot blank out the inventory.
pub async fn fetch_branches(
    client: &dyn HostingClient,
    org: &str,
    stub: RepositoryStub,
) -> RepositoryRecord {
    let mut record = RepositoryRecord::from_stub(stub);

    match client.list_branches(org, &record.name).await {
        Ok(branches) => {
            debug!(repo = %record.name, count = branches.len(), "listed branches");
            record.branches = branches;
        }
        Err(e) => {
            let message = format!("{e:#}");
            warn!(repo = %record.name, error = %message, "branch listing failed, publishing degraded record");
            record.degrade(message);
        }
    }

    record
}
