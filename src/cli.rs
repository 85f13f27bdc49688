//! Command line interface and run orchestration

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::debug;

use crate::core::{get_fetch_concurrency, resolve_credentials, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::hosting::build_client;
use crate::inventory::{inventory_organization, write_snapshot, EncodeOptions, FetchOptions, OutputFormat};
use crate::utils::stderr_is_terminal;

/// Inventory every repository and branch of a GitHub organization
#[derive(Parser, Debug)]
#[command(name = "repol", version, about)]
pub struct Cli {
    /// GitHub token [env: GITHUB_AUTH_TOKEN]
    #[arg(short = 't', long = "token")]
    pub token: Option<String>,

    /// GitHub organization [env: GITHUB_ORG]
    #[arg(short = 'o', long = "org")]
    pub org: Option<String>,

    /// GitHub Enterprise base URL [env: GITHUB_BASE_URL]
    #[arg(short = 'e', long = "enterprise-url")]
    pub enterprise_url: Option<String>,

    /// Debug mode: dump API responses and the final inventory to stderr
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Maximum number of concurrent branch fetches [env: REPOL_CONCURRENCY]
    #[arg(short = 'j', long = "jobs")]
    pub jobs: Option<usize>,

    /// Fetch branches one repository at a time
    #[arg(long = "sequential", conflicts_with = "jobs")]
    pub sequential: bool,

    /// Per-request timeout in seconds
    #[arg(long = "request-timeout", value_name = "SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout: u64,

    /// Overall time budget for branch fetches in seconds
    #[arg(long = "deadline", value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Output document format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Emit only name, giturl, cloneurl and branches for each repository
    #[arg(long = "compat")]
    pub compat: bool,

    /// Sort repositories by name instead of completion order
    #[arg(long = "sort")]
    pub sort: bool,
}

/// Runs one inventory and writes the document to stdout
///
/// Credentials are checked before any client is built, so a missing token
/// or organization never reaches the network.
pub async fn run(cli: Cli) -> Result<()> {
    let credentials = resolve_credentials(cli.token, cli.org, cli.enterprise_url, |key| {
        std::env::var(key).ok()
    })?;
    debug!(?credentials, "resolved credentials");

    let client = build_client(&credentials, Duration::from_secs(cli.request_timeout))?;

    let options = FetchOptions {
        concurrency: get_fetch_concurrency(cli.jobs, cli.sequential, |key| std::env::var(key).ok()),
        deadline: cli.deadline.map(Duration::from_secs),
        show_progress: !cli.debug && stderr_is_terminal(),
    };

    let mut snapshot = inventory_organization(client, &credentials.org, &options).await?;
    if cli.sort {
        snapshot.sort_by_name();
    }

    if cli.debug {
        debug!("final inventory:\n{snapshot:#?}");
    }

    let encode_options = EncodeOptions {
        format: cli.format,
        compat: cli.compat,
    };
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_snapshot(&mut handle, &snapshot, &encode_options).context("failed to output inventory")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["repol"]).unwrap();
        assert!(cli.token.is_none());
        assert!(!cli.debug);
        assert_eq!(cli.request_timeout, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(cli.format, OutputFormat::Yaml);
        assert!(cli.deadline.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::try_parse_from([
            "repol", "-t", "ghp_x", "-o", "acme", "-e", "https://ghe.example.com", "-d", "-j", "4",
        ])
        .unwrap();
        assert_eq!(cli.token.as_deref(), Some("ghp_x"));
        assert_eq!(cli.org.as_deref(), Some("acme"));
        assert_eq!(cli.enterprise_url.as_deref(), Some("https://ghe.example.com"));
        assert!(cli.debug);
        assert_eq!(cli.jobs, Some(4));
    }

    #[test]
    fn test_cli_format_and_timeouts() {
        let cli = Cli::try_parse_from([
            "repol", "--format", "json", "--deadline", "60", "--request-timeout", "10", "--compat", "--sort",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.deadline, Some(60));
        assert_eq!(cli.request_timeout, 10);
        assert!(cli.compat);
        assert!(cli.sort);
    }

    #[test]
    fn test_cli_sequential_conflicts_with_jobs() {
        assert!(Cli::try_parse_from(["repol", "--sequential", "-j", "3"]).is_err());
    }
}
