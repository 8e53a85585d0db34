use std::{fs, path::PathBuf};

use tracing::{debug, warn};

/// File extension of stored trajectories.
pub const TRAJECTORY_EXTENSION: &str = "crsdat";

/// Numbered output files `<directory>/<base>_<n>.crsdat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    directory: PathBuf,
    base_filename: String,
}

impl OutputNaming {
    /// Names files under `directory` with the given base.
    pub fn new(directory: impl Into<PathBuf>, base_filename: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            base_filename: base_filename.into(),
        }
    }

    /// Path of the file numbered `index`.
    pub fn path_for(&self, index: u32) -> PathBuf {
        self.directory.join(format!(
            "{}_{}.{}",
            self.base_filename, index, TRAJECTORY_EXTENSION
        ))
    }

    /// Extracts `n` from a file name of the form `<base>_<n>.crsdat`.
    pub fn index_of(&self, file_name: &str) -> Option<u32> {
        file_name
            .strip_prefix(&self.base_filename)?
            .strip_prefix('_')?
            .strip_suffix(TRAJECTORY_EXTENSION)?
            .strip_suffix('.')?
            .parse()
            .ok()
    }

    /// First index past every existing numbered file; 1 for an empty or
    /// missing directory.
    ///
    /// Directory scan failures are logged and treated as empty.
    pub fn next_index(&self) -> u32 {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                if self.directory.exists() {
                    warn!(directory = ?self.directory, error = %e, "Error scanning output directory");
                }
                return 1;
            }
        };

        let highest = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().to_str().and_then(|n| self.index_of(n)))
            .max()
            .unwrap_or(0);

        let next = highest.saturating_add(1);
        debug!(directory = ?self.directory, base = %self.base_filename, next, "Next output index");
        next
    }
}
