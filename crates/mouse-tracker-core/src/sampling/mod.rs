mod clock;
mod config;
mod cursor;
mod engine;
pub(crate) mod pacer;
mod point;
mod precision;
mod stop_signal;

pub use {
    clock::{Clock, MonotonicClock, TimingBase},
    config::{MIN_CADENCE_MS, Pacing, SamplingConfig, SamplingMode, SessionPlan, Termination},
    cursor::{CursorSource, SystemCursor},
    engine::{Capture, SamplingEngine, StopReason},
    point::{Point, Trajectory},
    precision::{OneShotTimer, PrecisionGuard, PrecisionPlatform, TimerCaps},
    stop_signal::StopSignal,
};
