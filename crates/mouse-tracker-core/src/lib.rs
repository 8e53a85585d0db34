//! Mouse Tracker Core Library
//!
//! Precision cursor sampling: reads the pointer position at a fixed
//! millisecond cadence, under elevated thread priority and a
//! high-resolution OS timer period, and stops by sample count or by
//! cursor idleness. Captured trajectories are stored as `x;y` lines.
//!
//! # Example
//!
//! ```no_run
//! use mouse_tracker_core::{
//!     CoreResult, SamplingConfig, SamplingEngine, SamplingMode, StopSignal, save_trajectory,
//! };
//!
//! use std::path::Path;
//!
//! fn main() -> CoreResult<()> {
//!     let mut engine = SamplingEngine::system()?;
//!
//!     // Record until the cursor rests for 500ms after first moving.
//!     let config = SamplingConfig::idle_after_first_move(500, 1);
//!     let capture = engine.capture(SamplingMode::IdleAfterFirstMove, &config, &StopSignal::new())?;
//!
//!     save_trajectory(Path::new("trajectory.crsdat"), &capture.trajectory)?;
//!     println!("Captured {} points", capture.trajectory.len());
//!     Ok(())
//! }
//! ```

mod error;
mod platform;
mod sampling;
mod storage;

pub use {
    error::Result as CoreResult,
    error::TrackerError,
    platform::{SystemPlatform, SystemTimer},
    sampling::{
        Capture, Clock, CursorSource, MIN_CADENCE_MS, MonotonicClock, OneShotTimer, Pacing, Point,
        PrecisionGuard, PrecisionPlatform, SamplingConfig, SamplingEngine, SamplingMode,
        SessionPlan, StopReason, StopSignal, SystemCursor, Termination, TimerCaps, TimingBase,
        Trajectory,
    },
    storage::{
        FIELD_SEPARATOR, LoadedTrajectory, OutputNaming, ParseWarning, TRAJECTORY_EXTENSION,
        format_point, load_trajectory, parse_point, read_points, save_trajectory, write_points,
    },
};
