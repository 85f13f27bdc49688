//! GitHub and GitHub Enterprise REST client

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{HostingClient, RepositoryStub};
use crate::core::config::{
    ACCEPT_HEADER, API_VERSION, API_VERSION_HEADER, BRANCH_PAGE_SIZE, MAX_PAGES, PUBLIC_API_URL,
    REPO_PAGE_SIZE, USER_AGENT,
};

const ENTERPRISE_API_SUFFIX: &str = "api/v3/";
const ENTERPRISE_UPLOAD_SUFFIX: &str = "api/uploads/";

#[derive(Deserialize)]
struct BranchPayload {
    name: String,
}

/// Client for the GitHub REST API
///
/// Stateless between calls, so one instance is shared by every fetch.
#[derive(Clone, Debug)]
pub struct GitHubClient {
    http: Client,
    api_url: Url,
}

impl GitHubClient {
    /// Creates a client for the public service
    pub fn new(token: &str, request_timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_http_client(token, request_timeout)?,
            api_url: Url::parse(PUBLIC_API_URL)?,
        })
    }

    /// Creates a client for a GitHub Enterprise instance
    ///
    /// `base_url` may be the bare host (`https://ghe.example.com`) or already
    /// point at the API root (`https://ghe.example.com/api/v3/`).
    pub fn with_enterprise(token: &str, base_url: &str, request_timeout: Duration) -> Result<Self> {
        let (api_url, upload_url) = resolve_enterprise_urls(base_url)?;
        debug!(api = %api_url, uploads = %upload_url, "using enterprise endpoints");
        Ok(Self {
            http: build_http_client(token, request_timeout)?,
            api_url,
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Builds an API URL from path segments, percent-encoding each one
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("API URL cannot be used as a base: {}", self.api_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Fetches one page of a list endpoint
    async fn get_page<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        debug!(%url, %status, headers = ?response.headers(), "API response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("API request failed ({status}): {}", body.trim());
        }

        response
            .json::<Vec<T>>()
            .await
            .with_context(|| format!("failed to parse response from {url}"))
    }

    /// Follows a list endpoint page by page until a short or empty page
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        per_page: u32,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let per_page_value = per_page.to_string();

        for page in 1..=MAX_PAGES {
            let mut url = self.endpoint(segments)?;
            {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in query {
                    pairs.append_pair(key, value);
                }
                pairs
                    .append_pair("per_page", &per_page_value)
                    .append_pair("page", &page.to_string());
            }

            let batch: Vec<T> = self.get_page(url).await?;
            let count = batch.len();
            items.extend(batch);

            if is_last_page(count, per_page) {
                return Ok(items);
            }
        }

        warn!(pages = MAX_PAGES, path = %segments.join("/"), "stopped paging at the safety limit");
        Ok(items)
    }
}

#[async_trait]
impl HostingClient for GitHubClient {
    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepositoryStub>> {
        self.get_all_pages(
            &["orgs", org, "repos"],
            &[("type", "all"), ("sort", "full_name")],
            REPO_PAGE_SIZE,
        )
        .await
    }

    async fn list_branches(&self, org: &str, repo: &str) -> Result<Vec<String>> {
        let branches: Vec<BranchPayload> = self
            .get_all_pages(&["repos", org, repo, "branches"], &[], BRANCH_PAGE_SIZE)
            .await?;
        Ok(branches.into_iter().map(|branch| branch.name).collect())
    }
}

/// A page shorter than the requested size is the last one
fn is_last_page(count: usize, per_page: u32) -> bool {
    count < per_page as usize
}

/// Builds the HTTP client with the bearer token and API headers preset
fn build_http_client(token: &str, request_timeout: Duration) -> Result<Client> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
        .context("token contains characters that are not allowed in an HTTP header")?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HEADER));
    headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

    Client::builder()
        .default_headers(headers)
        .user_agent(USER_AGENT)
        .timeout(request_timeout)
        .build()
        .context("failed to build HTTP client")
}

/// Resolves the API and upload roots of an enterprise instance
///
/// Hosts named `api.*` or `*.api.*` already serve the API at their root and
/// get no suffix.
pub(crate) fn resolve_enterprise_urls(base_url: &str) -> Result<(Url, Url)> {
    let mut base = Url::parse(base_url.trim()).with_context(|| format!("invalid base URL '{base_url}'"))?;
    if !matches!(base.scheme(), "http" | "https") {
        bail!("unsupported scheme '{}' in base URL '{base_url}'", base.scheme());
    }
    if base.host_str().is_none() {
        bail!("base URL '{base_url}' has no host");
    }

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let host = base.host_str().unwrap_or_default().to_string();
    let serves_api_at_root = host.starts_with("api.") || host.contains(".api.");

    let api_url = with_suffix(&base, ENTERPRISE_API_SUFFIX, serves_api_at_root);
    let upload_url = with_suffix(&base, ENTERPRISE_UPLOAD_SUFFIX, serves_api_at_root);
    Ok((api_url, upload_url))
}

fn with_suffix(base: &Url, suffix: &str, serves_api_at_root: bool) -> Url {
    let mut url = base.clone();
    let already_suffixed = url.path().ends_with(&format!("/{suffix}"));
    if !already_suffixed && !serves_api_at_root {
        let path = format!("{}{}", url.path(), suffix);
        url.set_path(&path);
    }
    url
}
