//! Precision context: elevated thread priority plus a high-resolution OS
//! timer period, held for the duration of one sampling session.
//!
//! The timer period is process-wide state. When sessions on different
//! threads overlap, the last release wins; releasing only withdraws this
//! session's request and never leaves a stale one behind.

use crate::CoreResult;

use std::time::Duration;

use tracing::{debug, warn};

/// Timer periods supported by the platform, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerCaps {
    /// Shortest supported period.
    pub period_min: u32,
    /// Longest supported period.
    pub period_max: u32,
}

impl TimerCaps {
    /// Finest period worth requesting: the platform minimum, never below
    /// 1 ms, never above the platform maximum.
    pub fn target_period(&self) -> u32 {
        self.period_min.max(1).min(self.period_max)
    }
}

/// Blocking one-shot high-resolution timer.
pub trait OneShotTimer {
    /// Blocks the calling thread until `due` has elapsed.
    ///
    /// A zero `due` arms and fires the timer immediately.
    fn wait(&mut self, due: Duration) -> CoreResult<()>;
}

/// Scheduling and timer primitives of the host OS.
pub trait PrecisionPlatform {
    /// Timer type handed out by [`PrecisionPlatform::create_timer`].
    type Timer: OneShotTimer;

    /// Raises the calling thread to the most time-critical priority class.
    fn raise_thread_priority(&self) -> CoreResult<()>;

    /// Restores the calling thread to normal priority.
    fn restore_thread_priority(&self);

    /// Queries the supported timer periods.
    fn timer_caps(&self) -> CoreResult<TimerCaps>;

    /// Requests a periodic timer resolution of `period_ms`.
    fn begin_timer_period(&self, period_ms: u32) -> CoreResult<()>;

    /// Withdraws a request made with [`PrecisionPlatform::begin_timer_period`].
    fn end_timer_period(&self, period_ms: u32);

    /// Creates a one-shot high-resolution timer.
    fn create_timer(&self) -> CoreResult<Self::Timer>;
}

/// RAII holder of a precision context.
///
/// Releases whatever it acquired when dropped, including during unwinding.
/// If acquisition fails halfway, the already-acquired part is released
/// before the error is returned.
pub struct PrecisionGuard<'a, P: PrecisionPlatform> {
    platform: &'a P,
    priority_raised: bool,
    period_ms: Option<u32>,
}

impl<'a, P: PrecisionPlatform> PrecisionGuard<'a, P> {
    /// Raises thread priority and activates the finest timer period.
    ///
    /// # Errors
    ///
    /// Returns the platform error if either resource cannot be acquired.
    pub fn acquire(platform: &'a P) -> CoreResult<Self> {
        let mut guard = Self {
            platform,
            priority_raised: false,
            period_ms: None,
        };

        platform.raise_thread_priority()?;
        guard.priority_raised = true;

        let caps = platform.timer_caps()?;
        let period = caps.target_period();
        platform.begin_timer_period(period)?;
        guard.period_ms = Some(period);

        debug!(
            period_ms = period,
            period_min = caps.period_min,
            period_max = caps.period_max,
            "Precision context acquired"
        );

        Ok(guard)
    }

    /// Active timer period in milliseconds.
    pub fn period_ms(&self) -> Option<u32> {
        self.period_ms
    }
}

impl<P: PrecisionPlatform> Drop for PrecisionGuard<'_, P> {
    fn drop(&mut self) {
        if let Some(period) = self.period_ms.take() {
            self.platform.end_timer_period(period);
        }

        if self.priority_raised {
            self.platform.restore_thread_priority();
            self.priority_raised = false;
        }

        if std::thread::panicking() {
            warn!("Precision context released during unwinding");
        } else {
            debug!("Precision context released");
        }
    }
}
