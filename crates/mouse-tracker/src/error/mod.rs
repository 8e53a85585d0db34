use mouse_tracker_core::TrackerError;

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the mouse-tracker binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Sampling or persistence error from mouse-tracker-core.
    #[error("Tracker error: {source} {location}")]
    Tracker {
        /// The underlying tracker error.
        #[source]
        source: TrackerError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Command-line arguments are inconsistent.
    #[error("Invalid arguments: {reason} {location}")]
    InvalidArguments {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to register global hotkey.
    #[error("Hotkey registration failed: {reason} {location}")]
    HotkeyRegistrationFailed {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to send message through a channel.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Human-readable error message.
        message: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A background worker stopped before answering.
    #[error("Worker unavailable: {reason} {location}")]
    WorkerUnavailable {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

impl AppError {
    /// Whether this error came from writing or reading a trajectory file.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            AppError::Tracker {
                source: TrackerError::Persistence { .. },
                ..
            }
        )
    }
}

// Manual From<TrackerError> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<TrackerError> for AppError {
    #[track_caller]
    fn from(source: TrackerError) -> Self {
        AppError::Tracker {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
