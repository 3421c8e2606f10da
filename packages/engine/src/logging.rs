//! Tracing setup for the driver binary
//!
//! stdout carries exactly one JSON reply per command line, so log output never
//! goes there: every event is written to stderr and, when a log directory is
//! configured, to a daily rolling file as well.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "diag-engine.log";
const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_FILTER: &str = "info";

/// Keeps the non-blocking file writer flushing until dropped
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Where the driver logs and at which verbosity
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `info` or `diag_engine=debug`
    pub filter: String,
    /// Rolling log directory; `None` logs to stderr only
    pub file_dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            file_dir: None,
        }
    }
}

impl LogSettings {
    /// `RUST_LOG`, plus `ENABLE_FILE_LOGS=true|1` with an optional `LOG_DIR`
    pub fn from_env() -> Self {
        let filter = std::env::var("RUST_LOG")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let file_dir = env_flag("ENABLE_FILE_LOGS").then(|| {
            std::env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_DIR))
        });

        Self { filter, file_dir }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|err| {
            eprintln!("invalid log filter {:?} ({err}), using {DEFAULT_FILTER}", self.filter);
            EnvFilter::new(DEFAULT_FILTER)
        })
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim(), "true" | "1"))
        .unwrap_or(false)
}

fn file_writer(dir: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber
///
/// A log directory that cannot be created is reported on stderr and skipped;
/// the returned guard must be held for as long as file logs should be flushed.
pub fn init_tracing(settings: &LogSettings) -> Option<FileLogGuard> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true);

    let file = settings
        .file_dir
        .as_deref()
        .and_then(|dir| match file_writer(dir) {
            Ok(pair) => Some(pair),
            Err(err) => {
                eprintln!("failed to create log directory {}: {err}", dir.display());
                None
            }
        });

    let (file_layer, guard) = match file {
        Some((writer, guard)) => (
            Some(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true),
            ),
            Some(FileLogGuard { _guard: guard }),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(settings.env_filter())
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}
