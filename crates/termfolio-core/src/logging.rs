#![forbid(unsafe_code)]

//! Tracing subscriber setup.
//!
//! The terminal UI owns stdout, so log lines always go to a file. The filter
//! comes from `TERMFOLIO_LOG`, then `RUST_LOG`, then the configured default
//! directive. Output is either human-readable lines or JSON objects, one per
//! event.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable consulted first for the filter directive.
pub const LOG_ENV_VAR: &str = "TERMFOLIO_LOG";

/// Directive used when neither environment variable is set.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Where and how to write log output.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Log file; created if missing, appended to otherwise.
    pub path: PathBuf,
    /// Emit JSON objects instead of formatted lines.
    pub json: bool,
    /// Fallback filter directive.
    pub default_directive: String,
}

impl LogOptions {
    /// Plain-text logging to `path` at the default level.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            json: false,
            default_directive: DEFAULT_DIRECTIVE.to_owned(),
        }
    }

    /// Switch to JSON lines.
    #[must_use]
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

/// Errors raised while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log file could not be opened for appending.
    #[error("cannot open log file {path}: {source}")]
    OpenLogFile {
        /// Requested path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The filter directive did not parse.
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    /// A global subscriber was already installed.
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInstalled(#[from] tracing_subscriber::util::TryInitError),
}

/// Build the filter from the environment, falling back to `default_directive`.
///
/// # Errors
///
/// Returns [`LoggingError::Filter`] when the fallback directive is invalid.
pub fn env_filter(default_directive: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV_VAR) {
        return Ok(filter);
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    Ok(EnvFilter::try_new(default_directive)?)
}

/// Install the global subscriber writing to `options.path`.
///
/// # Errors
///
/// Fails if the file cannot be opened, the filter is invalid, or a
/// subscriber is already installed.
pub fn init_file_logging(options: &LogOptions) -> Result<(), LoggingError> {
    let file = open_log_file(&options.path)?;
    let filter = env_filter(&options.default_directive)?;
    let writer = Mutex::new(file);

    if options.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_current_span(true),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(writer),
            )
            .try_init()?;
    }

    tracing::info!(
        target: "termfolio.logging",
        path = %options.path.display(),
        json = options.json,
        "logging initialized"
    );
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenLogFile {
            path: path.to_path_buf(),
            source,
        })
}
