use error_location::ErrorLocation;
use thiserror::Error;

/// Sampling and persistence errors with source location tracking.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Sampling mode or its parameters are unusable.
    ///
    /// Raised before a session acquires any platform resource.
    #[error("Configuration error: {reason} {location}")]
    Configuration {
        /// Description of the configuration problem.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Thread priority or timer resolution could not be acquired.
    #[error("Platform resource unavailable: {reason} {location}")]
    PlatformResource {
        /// Description of the failed platform call.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The OS refused to report the pointer position.
    #[error("Cursor position unavailable: {reason} {location}")]
    CursorUnavailable {
        /// Description of the cursor query failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Trajectory file could not be opened, read or written.
    #[error("Persistence failed for {path:?}: {source} {location}")]
    Persistence {
        /// File the operation targeted.
        path: std::path::PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`TrackerError`].
pub type Result<T> = std::result::Result<T, TrackerError>;
