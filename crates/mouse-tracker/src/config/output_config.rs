use crate::config::{default_base_filename, default_directory};

use std::path::PathBuf;

use mouse_tracker_core::OutputNaming;
use serde::{Deserialize, Serialize};

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the numbered trajectory files.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Base name of every file, as in `<base>_<n>.crsdat`.
    #[serde(default = "default_base_filename")]
    pub base_filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            base_filename: default_base_filename(),
        }
    }
}

impl OutputConfig {
    /// File naming scheme for this output location.
    pub fn naming(&self) -> OutputNaming {
        OutputNaming::new(&self.directory, &self.base_filename)
    }
}
