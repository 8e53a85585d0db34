//! Tracing subscriber setup.

use crate::{AppError, AppResult};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset.
pub(crate) const DEFAULT_FILTER: &str = "mouse_tracker=info,mouse_tracker_core=info";

/// Install the global subscriber: stderr always, plus `file` when given.
///
/// The returned guard flushes the file writer on drop and must live as
/// long as logging is needed.
///
/// # Errors
///
/// Returns [`AppError::ConfigError`] if `file` cannot be opened. Nothing is
/// installed in that case.
#[track_caller]
pub(crate) fn init(file: Option<&Path>) -> AppResult<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, guard) = match file {
        Some(path) => {
            let file_name = path.file_name().ok_or_else(|| AppError::ConfigError {
                reason: format!("Log file path has no file name: {:?}", path),
                location: ErrorLocation::from(Location::caller()),
            })?;
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));

            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(file_name.to_string_lossy().into_owned())
                .build(directory)
                .map_err(|e| AppError::ConfigError {
                    reason: format!("Failed to open log file {:?}: {}", path, e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}
