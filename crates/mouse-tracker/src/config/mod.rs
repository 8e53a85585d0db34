mod hotkey_config;
#[allow(clippy::module_inception)]
mod config;
mod logging_config;
mod output_config;
mod recording_config;

pub(crate) use {
    config::Config,
    hotkey_config::{HotkeyConfig, HotkeyPreset},
    logging_config::LoggingConfig,
    output_config::OutputConfig,
    recording_config::{RecorderMode, RecordingConfig},
};

pub(crate) const DEFAULT_DELAY_MS: u32 = 1000;
pub(crate) const DEFAULT_END_DELAY_MS: u32 = 2000;
pub(crate) const DEFAULT_COUNT: u32 = 1;
pub(crate) const DEFAULT_DELTA_MS: u32 = 1;
pub(crate) const DEFAULT_BASE_FILENAME: &str = "trajectory";

pub(crate) fn default_delay_ms() -> u32 {
    DEFAULT_DELAY_MS
}

pub(crate) fn default_end_delay_ms() -> u32 {
    DEFAULT_END_DELAY_MS
}

pub(crate) fn default_count() -> u32 {
    DEFAULT_COUNT
}

pub(crate) fn default_delta_ms() -> u32 {
    DEFAULT_DELTA_MS
}

pub(crate) fn default_directory() -> std::path::PathBuf {
    std::path::PathBuf::from(".")
}

pub(crate) fn default_base_filename() -> String {
    DEFAULT_BASE_FILENAME.to_string()
}
