//! In-memory hosting client with scripted delays and failures

use anyhow::{bail, Result};
use async_trait::async_trait;
use repol::hosting::{HostingClient, RepositoryStub};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::stub;

/// Scripted behavior of one repository's branch listing
#[derive(Clone, Debug)]
pub enum MockRepo {
    Branches(Vec<String>),
    Fails(String),
    Hangs,
}

pub struct MockHostingClient {
    repos: Vec<(String, MockRepo)>,
    listing_error: Option<String>,
    delays: HashMap<String, Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    listing_calls: AtomicUsize,
    branch_calls: Mutex<Vec<String>>,
}

impl MockHostingClient {
    pub fn new() -> Self {
        Self {
            repos: Vec::new(),
            listing_error: None,
            delays: HashMap::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            listing_calls: AtomicUsize::new(0),
            branch_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_branches(mut self, name: &str, branches: &[&str]) -> Self {
        let branches = branches.iter().map(|b| b.to_string()).collect();
        self.repos.push((name.to_string(), MockRepo::Branches(branches)));
        self
    }

    pub fn with_failure(mut self, name: &str, message: &str) -> Self {
        self.repos.push((name.to_string(), MockRepo::Fails(message.to_string())));
        self
    }

    pub fn with_hang(mut self, name: &str) -> Self {
        self.repos.push((name.to_string(), MockRepo::Hangs));
        self
    }

    pub fn with_delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    pub fn with_listing_error(mut self, message: &str) -> Self {
        self.listing_error = Some(message.to_string());
        self
    }

    pub fn stubs(&self) -> Vec<RepositoryStub> {
        self.repos.iter().map(|(name, _)| stub(name)).collect()
    }

    /// Highest number of branch listings observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn branch_calls(&self) -> Vec<String> {
        self.branch_calls.lock().unwrap().clone()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HostingClient for MockHostingClient {
    async fn list_org_repos(&self, _org: &str) -> Result<Vec<RepositoryStub>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.listing_error {
            bail!("{message}");
        }
        Ok(self.stubs())
    }

    async fn list_branches(&self, _org: &str, repo: &str) -> Result<Vec<String>> {
        self.branch_calls.lock().unwrap().push(repo.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(delay) = self.delays.get(repo) {
            tokio::time::sleep(*delay).await;
        }

        match self.repos.iter().find(|(name, _)| name == repo).map(|(_, behavior)| behavior) {
            Some(MockRepo::Branches(branches)) => Ok(branches.clone()),
            Some(MockRepo::Fails(message)) => bail!("{message}"),
            Some(MockRepo::Hangs) => {
                futures::future::pending::<()>().await;
                unreachable!()
            }
            None => bail!("API request failed (404 Not Found): no repository '{repo}'"),
        }
    }
}
