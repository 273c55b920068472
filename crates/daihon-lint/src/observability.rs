//! Logging and tracing setup.
//!
//! Console logging goes to stderr, filtered by `--quiet`/`--verbose`/
//! `RUST_LOG`. When a log path or directory is configured, validation runs
//! are additionally appended to a log file through a non-blocking writer;
//! the returned guard owns the writer and flushes it on drop, so the file
//! handle is scoped to the process rather than ambient. Concurrent
//! invocations are not coordinated; callers must serialize writes.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// File name used when only a log directory is configured.
const LOG_FILE_NAME: &str = "daihon-lint.log";

/// Where the file log should go, if anywhere.
#[derive(Debug, Default)]
pub struct ObservabilityConfig {
    /// Explicit log file path (takes precedence over the directory).
    pub log_path: Option<PathBuf>,
    /// Directory to place the log file in.
    pub log_dir: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Build from environment variables, with the config file's `log_dir`
    /// as a fallback.
    ///
    /// `DAIHON_LINT_LOG_PATH` wins over `DAIHON_LINT_LOG_DIR`, which wins
    /// over the config value.
    pub fn from_env_with_overrides(config_log_dir: Option<PathBuf>) -> Self {
        let log_path = std::env::var_os("DAIHON_LINT_LOG_PATH").map(PathBuf::from);
        let log_dir = std::env::var_os("DAIHON_LINT_LOG_DIR")
            .map(PathBuf::from)
            .or(config_log_dir);
        Self { log_path, log_dir }
    }

    fn resolved_path(&self) -> Option<PathBuf> {
        self.log_path
            .clone()
            .or_else(|| self.log_dir.as_ref().map(|dir| dir.join(LOG_FILE_NAME)))
    }
}

/// Build the console env filter.
///
/// `RUST_LOG` wins when set; otherwise `--quiet` forces errors only,
/// `-v`/`-vv` raise to debug/trace, and the config level is the default.
pub fn env_filter(quiet: bool, verbose: u8, config_level: &str) -> EnvFilter {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => config_level,
            1 => "debug",
            _ => "trace",
        }
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the tracing subscriber.
///
/// Returns the worker guard for the file appender when file logging is
/// active; hold it for the lifetime of the process.
pub fn init_observability(
    config: &ObservabilityConfig,
    filter: EnvFilter,
) -> anyhow::Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    match config.resolved_path() {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            Ok(None)
        }
    }
}
