use crate::config::{default_count, default_delay_ms, default_delta_ms, default_end_delay_ms};

use mouse_tracker_core::{Pacing, SamplingConfig, SamplingMode};
use serde::{Deserialize, Serialize};

/// How the recorder turns a hotkey press into sampling sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecorderMode {
    /// One fixed-count session of `count` points, then back to idle.
    Standard,
    /// One idle-after-first-move session ended by `delay_ms` of rest.
    Trajectory,
    /// Back-to-back idle-after-first-move sessions ended by
    /// `end_delay_ms` of rest, one file each, until the hotkey is pressed
    /// again.
    #[default]
    Continuous,
}

/// `[recording]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Session shape.
    #[serde(default)]
    pub mode: RecorderMode,

    /// Idle timeout for [`RecorderMode::Trajectory`].
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u32,

    /// Idle timeout for [`RecorderMode::Continuous`].
    #[serde(default = "default_end_delay_ms")]
    pub end_delay_ms: u32,

    /// Sample count for [`RecorderMode::Standard`].
    #[serde(default = "default_count")]
    pub count: u32,

    /// Cadence between samples.
    #[serde(default = "default_delta_ms")]
    pub delta_ms: u32,

    /// Pacing strategy. Programmed-timer pacing turns standard sessions
    /// into timer-assisted ones.
    #[serde(default)]
    pub pacing: Pacing,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            mode: RecorderMode::default(),
            delay_ms: default_delay_ms(),
            end_delay_ms: default_end_delay_ms(),
            count: default_count(),
            delta_ms: default_delta_ms(),
            pacing: Pacing::default(),
        }
    }
}

impl RecordingConfig {
    /// Engine mode and parameters for one session of this recorder.
    pub fn session(&self) -> (SamplingMode, SamplingConfig) {
        match self.mode {
            RecorderMode::Standard => {
                let mode = match self.pacing {
                    Pacing::BusyPoll => SamplingMode::FixedCount,
                    Pacing::ProgrammedTimer => SamplingMode::TimerAssisted,
                };
                (mode, SamplingConfig::fixed_count(self.count, self.delta_ms))
            }
            RecorderMode::Trajectory => (
                SamplingMode::IdleAfterFirstMove,
                SamplingConfig::idle_after_first_move(self.delay_ms, self.delta_ms)
                    .with_pacing(self.pacing),
            ),
            RecorderMode::Continuous => (
                SamplingMode::IdleAfterFirstMove,
                SamplingConfig::idle_after_first_move(self.end_delay_ms, self.delta_ms)
                    .with_pacing(self.pacing),
            ),
        }
    }
}
