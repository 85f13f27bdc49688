//! # repol
//!
//! `repol` takes an inventory of a GitHub organization: every repository with
//! its git URL, clone URL and branch names. It powers the `repol` CLI tool.
//!
//! ## Core Features
//!
//! - **Concurrent Fetching**: One branch listing per repository, bounded by a semaphore.
//! - **Partial Failure Tolerance**: A failed branch listing yields a degraded record, never an aborted run.
//! - **Enterprise Support**: Self-hosted GitHub Enterprise endpoints via a base URL.
//! - **Stable Output**: YAML or JSON documents with documented field names.
//!
//! ## Example
//!
//! ```rust,no_run
//! use repol::hosting::GitHubClient;
//! use repol::inventory::{inventory_organization, FetchOptions};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(GitHubClient::new("ghp_token", Duration::from_secs(30))?);
//!     let snapshot = inventory_organization(client, "my-org", &FetchOptions::default()).await?;
//!     for repo in &snapshot.repos {
//!         println!("{}: {:?}", repo.name, repo.branches);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod hosting;
pub mod inventory;
pub mod utils;
