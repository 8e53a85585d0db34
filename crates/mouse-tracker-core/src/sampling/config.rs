use crate::{CoreResult, TrackerError};

use std::{fmt, panic::Location, str::FromStr};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Smallest representable cadence and timeout, in milliseconds.
pub const MIN_CADENCE_MS: u32 = 1;

/// Stopping policy and loop shape of a sampling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingMode {
    /// Sample exactly `target_count` times, pacing by busy-polling.
    FixedCount,
    /// Wait for the cursor to move, then record until it rests for
    /// `idle_timeout_ms`.
    IdleAfterFirstMove,
    /// Record from the first sample until the cursor rests for
    /// `continuous_idle_timeout_ms`.
    ContinuousIdle,
    /// Sample exactly `target_count` times, pacing with a one-shot timer.
    TimerAssisted,
}

impl SamplingMode {
    /// Every mode, in declaration order.
    pub const ALL: [SamplingMode; 4] = [
        SamplingMode::FixedCount,
        SamplingMode::IdleAfterFirstMove,
        SamplingMode::ContinuousIdle,
        SamplingMode::TimerAssisted,
    ];

    /// Stable textual name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            SamplingMode::FixedCount => "fixed-count",
            SamplingMode::IdleAfterFirstMove => "idle-after-first-move",
            SamplingMode::ContinuousIdle => "continuous-idle",
            SamplingMode::TimerAssisted => "timer-assisted",
        }
    }

    /// Whether an external stop request can end the session early.
    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            SamplingMode::IdleAfterFirstMove | SamplingMode::ContinuousIdle
        )
    }
}

impl fmt::Display for SamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SamplingMode {
    type Err = TrackerError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SamplingMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| TrackerError::Configuration {
                reason: format!("Unknown sampling mode: {:?}", s),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// How the engine waits out the remainder of each cadence step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pacing {
    /// Spin on the monotonic counter. Burns a core, lowest jitter.
    #[default]
    BusyPoll,
    /// Block on a one-shot high-resolution timer. Cheap on CPU, subject to
    /// OS timer granularity.
    ProgrammedTimer,
}

impl FromStr for Pacing {
    type Err = TrackerError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "busy" | "busy-poll" => Ok(Pacing::BusyPoll),
            "timer" | "programmed-timer" => Ok(Pacing::ProgrammedTimer),
            other => Err(TrackerError::Configuration {
                reason: format!("Unknown pacing strategy: {:?}", other),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

/// Parameters of one sampling session.
///
/// Only the parameter matching the chosen [`SamplingMode`] is required.
/// Every millisecond and count value is clamped to at least 1 before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingConfig {
    /// Minimum time between successive samples.
    pub cadence_ms: u32,
    /// Number of samples for the fixed-count modes.
    pub target_count: Option<u32>,
    /// Rest duration ending an idle-after-first-move session.
    pub idle_timeout_ms: Option<u32>,
    /// Rest duration ending a continuous-idle session.
    pub continuous_idle_timeout_ms: Option<u32>,
    /// Pacing for modes that do not force one.
    pub pacing: Pacing,
    /// Hard cap on samples for the unbounded modes.
    pub max_samples: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            cadence_ms: MIN_CADENCE_MS,
            target_count: None,
            idle_timeout_ms: None,
            continuous_idle_timeout_ms: None,
            pacing: Pacing::BusyPoll,
            max_samples: None,
        }
    }
}

impl SamplingConfig {
    /// Config for [`SamplingMode::FixedCount`] and [`SamplingMode::TimerAssisted`].
    pub fn fixed_count(count: u32, cadence_ms: u32) -> Self {
        Self {
            cadence_ms,
            target_count: Some(count),
            ..Self::default()
        }
    }

    /// Config for [`SamplingMode::IdleAfterFirstMove`].
    pub fn idle_after_first_move(idle_timeout_ms: u32, cadence_ms: u32) -> Self {
        Self {
            cadence_ms,
            idle_timeout_ms: Some(idle_timeout_ms),
            ..Self::default()
        }
    }

    /// Config for [`SamplingMode::ContinuousIdle`].
    pub fn continuous_idle(timeout_ms: u32, cadence_ms: u32) -> Self {
        Self {
            cadence_ms,
            continuous_idle_timeout_ms: Some(timeout_ms),
            ..Self::default()
        }
    }

    /// Replaces the pacing strategy.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Caps the unbounded modes at `max_samples` samples.
    pub fn with_max_samples(mut self, max_samples: u64) -> Self {
        self.max_samples = Some(max_samples);
        self
    }

    /// Resolves `mode` against this config into an executable plan.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Configuration`] if the parameter required by
    /// `mode` is absent.
    #[track_caller]
    pub fn plan(&self, mode: SamplingMode) -> CoreResult<SessionPlan> {
        let cadence_ms = self.cadence_ms.max(MIN_CADENCE_MS);
        let max_samples = self.max_samples.map(|n| n.max(1));

        let (termination, pacing) = match mode {
            SamplingMode::FixedCount => (
                Termination::Count(clamp(self.target_count, "target_count", mode)?),
                self.pacing,
            ),
            SamplingMode::TimerAssisted => (
                Termination::Count(clamp(self.target_count, "target_count", mode)?),
                Pacing::ProgrammedTimer,
            ),
            SamplingMode::IdleAfterFirstMove => (
                Termination::IdleAfterFirstMove {
                    timeout_ms: clamp(self.idle_timeout_ms, "idle_timeout_ms", mode)?,
                },
                self.pacing,
            ),
            SamplingMode::ContinuousIdle => (
                Termination::ContinuousIdle {
                    timeout_ms: clamp(
                        self.continuous_idle_timeout_ms,
                        "continuous_idle_timeout_ms",
                        mode,
                    )?,
                },
                self.pacing,
            ),
        };

        Ok(SessionPlan {
            mode,
            cadence_ms,
            pacing,
            termination,
            max_samples,
        })
    }
}

#[track_caller]
fn clamp(value: Option<u32>, field: &str, mode: SamplingMode) -> CoreResult<u32> {
    value
        .map(|v| v.max(1))
        .ok_or_else(|| TrackerError::Configuration {
            reason: format!("Mode {} requires {}", mode, field),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Validated, clamped session parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPlan {
    /// Mode the plan was resolved from.
    pub mode: SamplingMode,
    /// Cadence in milliseconds, at least 1.
    pub cadence_ms: u32,
    /// Effective pacing strategy.
    pub pacing: Pacing,
    /// Stopping rule.
    pub termination: Termination,
    /// Optional cap for the unbounded modes.
    pub max_samples: Option<u64>,
}

/// Stopping rule of a [`SessionPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Stop after exactly this many samples.
    Count(u32),
    /// Gate on first movement, then stop after `timeout_ms` of rest.
    IdleAfterFirstMove {
        /// Rest duration in milliseconds.
        timeout_ms: u32,
    },
    /// Stop after `timeout_ms` of rest, counted from the first sample.
    ContinuousIdle {
        /// Rest duration in milliseconds.
        timeout_ms: u32,
    },
}
