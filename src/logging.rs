//! Tracing subscriber setup for the host binary.
//!
//! Output always goes to stderr (stdout carries protocol frames). When
//! `logging.directory` is set, a daily-rotated file copy is written too.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingSettings;
use crate::error::{Result, VerityError};

const LOG_FILE_PREFIX: &str = "verity-host";

/// Filter from `RUST_LOG` when set, otherwise from the configured level.
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for_level(&settings.level))
}

fn filter_for_level(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn file_appender(directory: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(directory)
        .map_err(|e| {
            VerityError::Config(format!(
                "cannot write logs to {}: {e}",
                directory.display()
            ))
        })
}

/// Install the global subscriber.
///
/// The returned guard must be held for the life of the process so buffered
/// file output is flushed on exit.
///
/// # Errors
///
/// [`VerityError::Config`] if the log directory is unusable or a global
/// subscriber is already installed.
pub fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry()
        .with(env_filter(settings))
        .with(stderr_layer);

    match &settings.directory {
        Some(directory) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(directory)?);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            registry
                .with(file_layer)
                .try_init()
                .map_err(|e| VerityError::Config(format!("failed to install tracing: {e}")))?;
            Ok(Some(guard))
        }
        None => {
            registry
                .try_init()
                .map_err(|e| VerityError::Config(format!("failed to install tracing: {e}")))?;
            Ok(None)
        }
    }
}
