//! Fan-out/fan-in coordinator for branch fetches.
//!
//! One task is spawned per repository stub. Every task publishes exactly one
//! record on the completion sink, success or degraded. A supervisor joins all
//! tasks and only then drops the last sender, which is what closes the sink.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use super::fetcher::fetch_branches;
use super::{OrganizationSnapshot, RepositoryRecord};
use crate::core::create_fetch_context;
use crate::hosting::{HostingClient, RepositoryStub};

const DEADLINE_EXCEEDED: &str = "deadline exceeded before the branch listing completed";

/// Settings for one fan-out
#[derive(Clone, Debug)]
pub struct FetchOptions {
    /// Maximum number of branch fetches in flight
    pub concurrency: usize,
    /// Overall time budget; unfinished fetches become degraded records
    pub deadline: Option<Duration>,
    /// Draw a progress spinner on stderr
    pub show_progress: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            concurrency: crate::core::FETCH_CONCURRENT_CAP,
            deadline: None,
            show_progress: false,
        }
    }
}

type Sink = mpsc::UnboundedSender<RepositoryRecord>;

/// Fetches branches for every stub concurrently and collects the snapshot
///
/// Returns only after every spawned task has terminated. The snapshot holds
/// exactly one record per stub, in completion order.
pub async fn collect_snapshot(
    client: Arc<dyn HostingClient>,
    org: &str,
    stubs: Vec<RepositoryStub>,
    options: &FetchOptions,
) -> Result<OrganizationSnapshot> {
    let context = create_fetch_context(
        stubs.len(),
        std::time::Instant::now(),
        options.concurrency,
        options.show_progress,
    )?;
    // A budget too large to represent as an instant is treated as no deadline.
    let deadline = options.deadline.and_then(|budget| {
        let at = Instant::now().checked_add(budget);
        if at.is_none() {
            debug!(?budget, "deadline out of range, running without one");
        }
        at
    });
    let org: Arc<str> = Arc::from(org);

    debug!(
        repos = context.total_repos,
        concurrency = context.max_concurrency,
        ?deadline,
        "starting branch fan-out"
    );

    let (sink, mut drain) = mpsc::unbounded_channel();

    let launched: Vec<(RepositoryStub, JoinHandle<()>)> = stubs
        .into_iter()
        .map(|stub| {
            let task = tokio::spawn(run_fetch(
                Arc::clone(&client),
                Arc::clone(&org),
                stub.clone(),
                Arc::clone(&context.semaphore),
                deadline,
                sink.clone(),
            ));
            (stub, task)
        })
        .collect();

    // The supervisor owns the first sender; the sink closes once it and
    // every task have dropped theirs.
    let supervisor = tokio::spawn(supervise(launched, sink));

    let mut snapshot = OrganizationSnapshot::with_capacity(context.total_repos);
    while let Some(record) = drain.recv().await {
        debug!(repo = %record.name, status = %record.status, "record published");
        context.record(&record);
        snapshot.push(record);
    }

    supervisor.await.context("fetch supervisor failed")?;
    context.finish();

    Ok(snapshot)
}

/// Runs one branch fetch under the concurrency limit and publishes its record
async fn run_fetch(
    client: Arc<dyn HostingClient>,
    org: Arc<str>,
    stub: RepositoryStub,
    semaphore: Arc<Semaphore>,
    deadline: Option<Instant>,
    sink: Sink,
) {
    let fallback = stub.clone();

    let work = async {
        let _permit = match semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => return RepositoryRecord::degraded(stub, format!("concurrency limiter closed: {e}")),
        };
        fetch_branches(client.as_ref(), &org, stub).await
    };

    let record = match deadline {
        Some(at) => match tokio::time::timeout_at(at, work).await {
            Ok(record) => record,
            Err(_) => {
                warn!(repo = %fallback.name, "deadline exceeded, publishing degraded record");
                RepositoryRecord::degraded(fallback, DEADLINE_EXCEEDED)
            }
        },
        None => work.await,
    };

    if sink.send(record).is_err() {
        debug!("completion sink closed before the record was published");
    }
}

/// Joins every fetch task, then closes the sink by dropping the last sender
///
/// A task that panicked never published, so its stub gets a degraded record
/// here instead.
async fn supervise(launched: Vec<(RepositoryStub, JoinHandle<()>)>, sink: Sink) {
    for (stub, task) in launched {
        if let Err(e) = task.await {
            error!(repo = %stub.name, error = %e, "fetch task terminated abnormally");
            let message = format!("fetch task failed: {e}");
            if sink.send(RepositoryRecord::degraded(stub, message)).is_err() {
                debug!("completion sink closed before the record was published");
            }
        }
    }
    drop(sink);
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use async_trait::async_trait;

    struct PanickyClient;

    #[async_trait]
    impl HostingClient for PanickyClient {
        async fn list_org_repos(&self, _org: &str) -> Result<Vec<RepositoryStub>> {
            bail!("not used")
        }

        async fn list_branches(&self, _org: &str, repo: &str) -> Result<Vec<String>> {
            if repo == "explodes" {
                panic!("simulated client bug");
            }
            Ok(vec!["main".to_string()])
        }
    }

    fn stub(name: &str) -> RepositoryStub {
        RepositoryStub {
            name: name.to_string(),
            git_url: String::new(),
            clone_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_panicking_task_still_yields_a_record() {
        let client: Arc<dyn HostingClient> = Arc::new(PanickyClient);
        let stubs = vec![stub("fine"), stub("explodes"), stub("also-fine")];

        let snapshot = collect_snapshot(client, "acme", stubs, &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(snapshot.len(), 3);
        let exploded = snapshot.get("explodes").unwrap();
        assert!(exploded.is_degraded());
        assert!(exploded.error.as_deref().unwrap().contains("fetch task failed"));
        assert_eq!(snapshot.get("fine").unwrap().branches, vec!["main"]);
    }

    #[tokio::test]
    async fn test_empty_stub_list_returns_empty_snapshot() {
        let client: Arc<dyn HostingClient> = Arc::new(PanickyClient);
        let snapshot = collect_snapshot(client, "acme", Vec::new(), &FetchOptions::default())
            .await
            .unwrap();
        assert!(snapshot.is_empty());
    }
}
