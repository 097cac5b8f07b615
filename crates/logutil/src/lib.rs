//! Utilities for logging.

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggingMode {
    /// Human readable, one line per event.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

/// Build a filter from `RUST_LOG`, falling back to `default_level`.
fn env_filter(default_level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}

/// Configure the global logger.
///
/// Returns false if a global subscriber was already installed.
pub fn configure_global_logger(default_level: Level, mode: LoggingMode) -> bool {
    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter(default_level))
        .with_file(true)
        .with_line_number(true);

    let result = match mode {
        LoggingMode::Compact => tracing::subscriber::set_global_default(builder.finish()),
        LoggingMode::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };

    result.is_ok()
}

static TEST_INIT: Once = Once::new();

/// Install a subscriber that writes through the test harness's captured
/// output.
///
/// Safe to call from every test, only the first call does anything.
pub fn init_test() {
    TEST_INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_test_writer()
            .with_env_filter(env_filter(Level::DEBUG))
            .with_file(true)
            .with_line_number(true)
            .finish();
        // Another harness may have installed one already, that's fine.
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
