pub(crate) mod terminal;

// Public API - utilities used by the CLI
pub use terminal::{init_logging, stderr_is_terminal};
