//! Configuration constants and credential resolution

use std::fmt;

// Environment fallbacks for the command line flags
pub const TOKEN_ENV_VAR: &str = "GITHUB_AUTH_TOKEN";
pub const ORG_ENV_VAR: &str = "GITHUB_ORG";
pub const BASE_URL_ENV_VAR: &str = "GITHUB_BASE_URL";
pub const CONCURRENCY_ENV_VAR: &str = "REPOL_CONCURRENCY";

// Public GitHub endpoint, used unless an enterprise base URL is given
pub const PUBLIC_API_URL: &str = "https://api.github.com/";

// Request headers sent with every API call
pub const USER_AGENT: &str = concat!("repol/", env!("CARGO_PKG_VERSION"));
pub const ACCEPT_HEADER: &str = "application/vnd.github+json";
pub const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
pub const API_VERSION: &str = "2022-11-28";

// Pagination. 100 is the provider maximum for both listings.
pub const REPO_PAGE_SIZE: u32 = 100;
pub const BRANCH_PAGE_SIZE: u32 = 100;
pub const MAX_PAGES: u32 = 1000;

// Concurrency Configuration
//
// Branch listing is network-bound, so the default runs two fetches per core.
// The cap keeps large organizations from opening hundreds of connections at once.
pub const FETCH_CONCURRENT_CAP: usize = 16;

// Timeouts
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

// Display formatting constants
pub const ERROR_MESSAGE_MAX_LENGTH: usize = 60;
pub const ERROR_MESSAGE_TRUNCATE_LENGTH: usize = 57;
pub const PROGRESS_TEMPLATE: &str = "{spinner} {pos}/{len} {wide_msg}";
pub const FETCHING_MESSAGE: &str = "fetching branches...";

/// Token, organization and optional enterprise endpoint for one run
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub org: String,
    pub base_url: Option<String>,
}

// Keeps the token out of debug dumps.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("org", &self.org)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// A required credential is missing from both the flags and the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    MissingToken,
    MissingOrg,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::MissingToken => write!(f, "No value for '-t' or {TOKEN_ENV_VAR}"),
            CredentialError::MissingOrg => write!(f, "No value for '-o' or {ORG_ENV_VAR}"),
        }
    }
}

impl std::error::Error for CredentialError {}

/// Resolves credentials from explicit flags, falling back to the environment
///
/// An explicit flag always wins, even when it is empty. Empty token or
/// organization values are treated as missing. `lookup` is the environment
/// accessor, normally `|key| std::env::var(key).ok()`.
pub fn resolve_credentials<F>(
    token: Option<String>,
    org: Option<String>,
    base_url: Option<String>,
    lookup: F,
) -> Result<Credentials, CredentialError>
where
    F: Fn(&str) -> Option<String>,
{
    let token = token
        .or_else(|| lookup(TOKEN_ENV_VAR))
        .filter(|value| !value.is_empty())
        .ok_or(CredentialError::MissingToken)?;

    let org = org
        .or_else(|| lookup(ORG_ENV_VAR))
        .filter(|value| !value.is_empty())
        .ok_or(CredentialError::MissingOrg)?;

    let base_url = base_url
        .or_else(|| lookup(BASE_URL_ENV_VAR))
        .filter(|value| !value.trim().is_empty());

    Ok(Credentials {
        token,
        org,
        base_url,
    })
}

/// Determines how many branch fetches may be in flight at once
///
/// Priority order:
/// 1. --sequential flag → 1
/// 2. --jobs N flag → N
/// 3. REPOL_CONCURRENCY env var → N
/// 4. Smart default → min(CPU_CORES * 2, 16)
pub fn get_fetch_concurrency<F>(jobs: Option<usize>, sequential: bool, lookup: F) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    if sequential {
        return 1;
    }

    if let Some(n) = jobs {
        return n.max(1);
    }

    if let Some(n) = lookup(CONCURRENCY_ENV_VAR).and_then(|value| value.trim().parse::<usize>().ok()) {
        if n > 0 {
            return n;
        }
    }

    (num_cpus::get() * 2).clamp(1, FETCH_CONCURRENT_CAP)
}
