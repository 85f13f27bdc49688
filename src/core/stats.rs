//! Statistics tracking for inventory runs

use crate::core::config::{ERROR_MESSAGE_MAX_LENGTH, ERROR_MESSAGE_TRUNCATE_LENGTH};
use crate::inventory::RepositoryRecord;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Statistics for tracking branch fetch results
///
/// Uses atomic counters for lock-free reads and writes of simple counters,
/// while the list of degraded repositories remains behind a Mutex.
#[derive(Debug)]
pub struct InventoryStatistics {
    pub fetched_repos: AtomicU64,
    pub degraded_repos: AtomicU64,
    pub total_branches: AtomicU64,
    pub failed_repos: Mutex<Vec<(String, String)>>, // (repo_name, error_message)
}

impl Default for InventoryStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryStatistics {
    /// Creates a new statistics tracker with all counters initialized to zero
    pub fn new() -> Self {
        Self {
            fetched_repos: AtomicU64::new(0),
            degraded_repos: AtomicU64::new(0),
            total_branches: AtomicU64::new(0),
            failed_repos: Mutex::new(Vec::new()),
        }
    }

    /// Updates statistics with one published record
    pub fn record(&self, record: &RepositoryRecord) {
        if record.is_degraded() {
            self.degraded_repos.fetch_add(1, Ordering::Relaxed);
            let message = clean_error_message(record.error.as_deref().unwrap_or("unknown error"));
            if let Ok(mut guard) = self.failed_repos.lock() {
                guard.push((record.name.clone(), message));
            } else {
                tracing::warn!(repo = %record.name, "failed to record degraded repository");
            }
        } else {
            self.fetched_repos.fetch_add(1, Ordering::Relaxed);
            self.total_branches
                .fetch_add(record.branches.len() as u64, Ordering::Relaxed);
        }
    }

    /// Number of records seen so far
    pub fn completed(&self) -> u64 {
        self.fetched_repos.load(Ordering::Relaxed) + self.degraded_repos.load(Ordering::Relaxed)
    }

    /// Generates a one-line summary of the run
    pub fn generate_summary(&self, duration: Duration) -> String {
        let duration_secs = duration.as_secs_f64();

        let fetched = self.fetched_repos.load(Ordering::Relaxed);
        let degraded = self.degraded_repos.load(Ordering::Relaxed);
        let branches = self.total_branches.load(Ordering::Relaxed);

        if degraded > 0 {
            format!(
                "✅ Completed in {:.1}s • {} repos • {} branches • {} degraded",
                duration_secs,
                fetched + degraded,
                branches,
                degraded
            )
        } else {
            format!(
                "✅ Completed in {:.1}s • {} repos • {} branches",
                duration_secs, fetched, branches
            )
        }
    }

    /// Lists repositories whose branch fetch failed, one per line
    pub fn generate_detailed_summary(&self) -> String {
        let failed_repos = match self.failed_repos.lock() {
            Ok(guard) => guard,
            Err(_) => return String::new(),
        };

        if failed_repos.is_empty() {
            return String::new();
        }

        let mut lines = Vec::with_capacity(failed_repos.len() + 1);
        lines.push(format!("🔴 DEGRADED REPOS ({})", failed_repos.len()));
        for (i, (repo_name, error)) in failed_repos.iter().enumerate() {
            let tree_char = if i == failed_repos.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            lines.push(format!("   {} {:20} # {}", tree_char, repo_name, error));
        }

        lines.join("\n")
    }
}

/// Cleans and formats error messages for display
pub(crate) fn clean_error_message(error: &str) -> String {
    // Replace newlines/tabs with spaces and collapse whitespace
    let cleaned = error
        .replace('\n', " ")
        .replace('\r', "")
        .replace('\t', " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    // Extract key error patterns
    if cleaned.contains("deadline exceeded") {
        "deadline exceeded".to_string()
    } else if cleaned.contains("timed out") {
        "timeout".to_string()
    } else if has_status(&cleaned, 401) || cleaned.contains("Bad credentials") {
        "authentication failed".to_string()
    } else if has_status(&cleaned, 403) {
        "access denied".to_string()
    } else if has_status(&cleaned, 404) {
        "not found".to_string()
    } else if cleaned.contains("connect") || cleaned.contains("Connection") || cleaned.contains("network") {
        "network error".to_string()
    } else if cleaned.chars().count() > ERROR_MESSAGE_MAX_LENGTH {
        let truncated: String = cleaned.chars().take(ERROR_MESSAGE_TRUNCATE_LENGTH).collect();
        format!("{truncated}...")
    } else {
        cleaned
    }
}

// API errors carry the status as "(NNN Reason)"; bare digits may be part of a name.
fn has_status(message: &str, code: u16) -> bool {
    message.contains(&format!("({code} "))
}
