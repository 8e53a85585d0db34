use crate::{CoreResult, OneShotTimer, PrecisionPlatform, TimerCaps};

use std::time::Duration;

use tracing::{debug, instrument};

/// Platform without user-space priority or timer-period controls.
///
/// Thread priority and timer period requests are accepted and ignored;
/// the kernel already schedules `nanosleep` on high-resolution timers.
#[derive(Debug, Default, Clone, Copy)]
pub struct PortablePlatform;

impl PortablePlatform {
    /// Creates the platform handle. Holds no OS resources.
    pub fn new() -> Self {
        Self
    }
}

impl PrecisionPlatform for PortablePlatform {
    type Timer = SleepTimer;

    fn raise_thread_priority(&self) -> CoreResult<()> {
        debug!("Thread priority elevation not available on this platform");
        Ok(())
    }

    fn restore_thread_priority(&self) {}

    fn timer_caps(&self) -> CoreResult<TimerCaps> {
        Ok(TimerCaps {
            period_min: 1,
            period_max: 1,
        })
    }

    fn begin_timer_period(&self, _period_ms: u32) -> CoreResult<()> {
        Ok(())
    }

    fn end_timer_period(&self, _period_ms: u32) {}

    #[instrument(skip(self))]
    fn create_timer(&self) -> CoreResult<SleepTimer> {
        Ok(SleepTimer)
    }
}

/// One-shot timer backed by `std::thread::sleep` (`nanosleep` on Unix).
#[derive(Debug, Default)]
pub struct SleepTimer;

impl OneShotTimer for SleepTimer {
    fn wait(&mut self, due: Duration) -> CoreResult<()> {
        if !due.is_zero() {
            std::thread::sleep(due);
        }
        Ok(())
    }
}
