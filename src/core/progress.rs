//! Progress reporting and the shared state of one fan-out

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use super::config::{FETCHING_MESSAGE, PROGRESS_TEMPLATE};
use super::stats::InventoryStatistics;
use crate::utils::terminal::set_active_progress;

/// Fetch context that encapsulates the shared state of one fan-out
///
/// Groups the concurrency limiter, statistics and progress display that
/// every branch fetch of a run shares.
pub struct FetchContext {
    /// Thread-safe statistics tracking for fetch results
    pub statistics: Arc<InventoryStatistics>,
    /// Semaphore bounding the number of in-flight branch fetches
    pub semaphore: Arc<Semaphore>,
    /// Maximum configured concurrency level
    pub max_concurrency: usize,
    /// Progress display on stderr; hidden when not interactive
    pub progress: ProgressBar,
    /// Total number of repositories being fetched
    pub total_repos: usize,
    /// Start time for duration calculations
    pub start_time: std::time::Instant,
    // Whether this context registered its spinner with the log writer
    owns_log_progress: bool,
}

impl FetchContext {
    /// Updates statistics and progress for one published record
    pub fn record(&self, record: &crate::inventory::RepositoryRecord) {
        self.statistics.record(record);
        self.progress.set_position(self.statistics.completed());
    }

    /// Finishes the progress display and reports the run summary
    pub fn finish(&self) {
        let summary = self.statistics.generate_summary(self.start_time.elapsed());
        if self.progress.is_hidden() {
            tracing::info!("{summary}");
            return;
        }

        set_active_progress(None);
        self.progress.finish_with_message(summary);
        let detailed_summary = self.statistics.generate_detailed_summary();
        if !detailed_summary.is_empty() {
            self.progress.println(detailed_summary);
        }
    }
}

impl Drop for FetchContext {
    fn drop(&mut self) {
        if self.owns_log_progress {
            set_active_progress(None);
        }
    }
}

/// Creates a FetchContext for `total_repos` fetches
///
/// With `show_progress`, the spinner is registered with the log writer so
/// warnings are printed above it instead of through it.
pub fn create_fetch_context(
    total_repos: usize,
    start_time: std::time::Instant,
    concurrent_limit: usize,
    show_progress: bool,
) -> Result<FetchContext> {
    let max_concurrency = concurrent_limit.max(1);
    let progress = if show_progress {
        let progress = create_progress_bar(total_repos as u64)?;
        set_active_progress(Some(progress.clone()));
        progress
    } else {
        ProgressBar::hidden()
    };

    Ok(FetchContext {
        statistics: Arc::new(InventoryStatistics::new()),
        semaphore: Arc::new(Semaphore::new(max_concurrency)),
        max_concurrency,
        progress,
        total_repos,
        start_time,
        owns_log_progress: show_progress,
    })
}

/// Creates a progress bar drawing to stderr, leaving stdout to the document
pub(crate) fn create_progress_bar(total: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(create_progress_style()?);
    pb.set_message(FETCHING_MESSAGE);
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

/// Creates a progress bar style configuration
pub(crate) fn create_progress_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_spinner().template(PROGRESS_TEMPLATE)?)
}
