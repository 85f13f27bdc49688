//! Terminal utilities for diagnostics and progress output
//!
//! Stdout carries the inventory document, so everything here writes to stderr.

use indicatif::ProgressBar;
use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

// Spinner currently drawing on stderr, if any. Log lines are written while it
// is suspended so they never land in the middle of a redraw.
static ACTIVE_PROGRESS: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// Returns true when stderr is attached to a terminal
pub fn stderr_is_terminal() -> bool {
    std::io::stderr().is_terminal()
}

/// Registers the spinner that log output must not interleave with
pub(crate) fn set_active_progress(progress: Option<ProgressBar>) {
    if let Ok(mut active) = ACTIVE_PROGRESS.lock() {
        *active = progress;
    }
}

pub(crate) fn active_progress() -> Option<ProgressBar> {
    ACTIVE_PROGRESS.lock().ok().and_then(|active| active.clone())
}

/// Stderr log writer that steps around the active spinner
#[derive(Clone, Copy, Debug, Default)]
pub struct LogWriter;

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match active_progress() {
            Some(progress) => progress.suspend(|| io::stderr().write_all(buf))?,
            None => io::stderr().write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        *self
    }
}

/// Builds the log filter for a run
///
/// `--debug` forces debug output for this crate. Otherwise `RUST_LOG` applies,
/// defaulting to warnings so degraded fetches always surface.
pub(crate) fn log_filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("repol=debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("repol=warn"))
}

/// Installs the stderr log subscriber; a second call is a no-op
pub fn init_logging(debug: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(debug))
        .with_writer(LogWriter)
        .with_target(false)
        .try_init();
}
