use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also append log lines to this file.
    #[serde(default)]
    pub file: Option<PathBuf>,
}
