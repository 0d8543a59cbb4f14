//! This module sets up logging for the runner.

use ct_particles::DATA_DIR;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{filter::LevelFilter, fmt::Layer, prelude::*, EnvFilter};
use tracing_unwrap::ResultExt;

/// The common prefix for the runner's log files.
const LOG_PREFIX: &str = "runner.log";

/// The log files get per-frame summaries from the debug driver.
const FILE_LEVEL: LevelFilter = LevelFilter::DEBUG;

/// The terminal only gets commands and lifecycle events, unless `RUST_LOG` says otherwise.
const STDOUT_LEVEL: LevelFilter = LevelFilter::INFO;

/// The directory that the hourly log files go in.
fn log_directory() -> String {
    format!("{DATA_DIR}/logs")
}

/// A filter at `level`, which `RUST_LOG` can override if `from_env` is true.
fn level_filter(level: LevelFilter, from_env: bool) -> EnvFilter {
    let builder = EnvFilter::builder().with_default_directive(level.into());
    if from_env {
        builder.from_env_lossy()
    } else {
        builder.parse_lossy("")
    }
}

/// Initialise a subscriber for tracing to log to `stdout` and a file.
///
/// The returned guard must be kept alive for as long as logs should be written to the file.
pub fn init_tracing() -> WorkerGuard {
    let (appender, guard) = non_blocking(rolling::hourly(log_directory(), LOG_PREFIX));

    let file_layer = Layer::new()
        .with_writer(appender)
        .with_ansi(false)
        .with_filter(level_filter(FILE_LEVEL, false));
    let stdout_layer = Layer::new()
        .with_writer(std::io::stdout)
        .with_filter(level_filter(STDOUT_LEVEL, true));

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(file_layer)
            .with(stdout_layer),
    )
    .expect_or_log("Setting the global default for tracing should be okay");

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_directory_test() {
        assert!(log_directory().ends_with("/logs"));
        assert!(log_directory().starts_with(DATA_DIR));
    }

    #[test]
    fn file_filter_ignores_env_test() {
        let filter = level_filter(FILE_LEVEL, false);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
