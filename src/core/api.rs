//! Public API for the core module.
//!
//! This module provides the stable public API for core functionality including:
//! - Credential and concurrency resolution
//! - Fetch context management
//! - Statistics tracking
//!
//! Internal implementation details are not exposed through this API.

// Core types
pub use super::progress::{create_fetch_context, FetchContext};
pub use super::stats::InventoryStatistics;

// Configuration
pub use super::config::{get_fetch_concurrency, resolve_credentials, CredentialError, Credentials};
pub use super::config::{
    BASE_URL_ENV_VAR, CONCURRENCY_ENV_VAR, DEFAULT_REQUEST_TIMEOUT_SECS, FETCH_CONCURRENT_CAP,
    ORG_ENV_VAR, TOKEN_ENV_VAR,
};
