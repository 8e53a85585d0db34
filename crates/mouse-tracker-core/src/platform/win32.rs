use crate::{CoreResult, OneShotTimer, PrecisionPlatform, TimerCaps, TrackerError};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use tracing::{instrument, warn};
use windows::{
    Win32::{
        Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0},
        Media::{TIMECAPS, TIMERR_NOERROR, timeBeginPeriod, timeEndPeriod, timeGetDevCaps},
        System::Threading::{
            CREATE_WAITABLE_TIMER_HIGH_RESOLUTION, CreateWaitableTimerExW, GetCurrentThread,
            INFINITE, SetThreadPriority, SetWaitableTimer, THREAD_PRIORITY_NORMAL,
            THREAD_PRIORITY_TIME_CRITICAL, TIMER_ALL_ACCESS, WaitForSingleObject,
        },
    },
    core::PCWSTR,
};

/// Win32 thread priority, `timeBeginPeriod` and waitable timers.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsPlatform;

impl WindowsPlatform {
    /// Creates the platform handle. Holds no OS resources.
    pub fn new() -> Self {
        Self
    }
}

impl PrecisionPlatform for WindowsPlatform {
    type Timer = WaitableTimer;

    #[track_caller]
    fn raise_thread_priority(&self) -> CoreResult<()> {
        // SAFETY: GetCurrentThread returns a pseudo handle that needs no cleanup.
        unsafe { SetThreadPriority(GetCurrentThread(), THREAD_PRIORITY_TIME_CRITICAL) }.map_err(
            |e| TrackerError::PlatformResource {
                reason: format!("SetThreadPriority(TIME_CRITICAL) failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            },
        )
    }

    fn restore_thread_priority(&self) {
        // SAFETY: see raise_thread_priority.
        if let Err(e) = unsafe { SetThreadPriority(GetCurrentThread(), THREAD_PRIORITY_NORMAL) } {
            warn!(error = %e, "Failed to restore normal thread priority");
        }
    }

    #[track_caller]
    fn timer_caps(&self) -> CoreResult<TimerCaps> {
        let mut tc = TIMECAPS::default();

        // SAFETY: tc is a valid, correctly sized TIMECAPS.
        let rc = unsafe { timeGetDevCaps(&mut tc, std::mem::size_of::<TIMECAPS>() as u32) };

        if rc != TIMERR_NOERROR {
            return Err(TrackerError::PlatformResource {
                reason: format!("timeGetDevCaps failed with code {}", rc),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(TimerCaps {
            period_min: tc.wPeriodMin,
            period_max: tc.wPeriodMax,
        })
    }

    #[track_caller]
    fn begin_timer_period(&self, period_ms: u32) -> CoreResult<()> {
        // SAFETY: plain value argument.
        let rc = unsafe { timeBeginPeriod(period_ms) };

        if rc != TIMERR_NOERROR {
            return Err(TrackerError::PlatformResource {
                reason: format!("timeBeginPeriod({}) failed with code {}", period_ms, rc),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    fn end_timer_period(&self, period_ms: u32) {
        // SAFETY: paired with a successful timeBeginPeriod of the same value.
        let rc = unsafe { timeEndPeriod(period_ms) };

        if rc != TIMERR_NOERROR {
            warn!(period_ms, code = rc, "timeEndPeriod failed");
        }
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn create_timer(&self) -> CoreResult<WaitableTimer> {
        // SAFETY: no security attributes, anonymous timer.
        let handle = unsafe {
            CreateWaitableTimerExW(
                None,
                PCWSTR::null(),
                CREATE_WAITABLE_TIMER_HIGH_RESOLUTION,
                TIMER_ALL_ACCESS.0,
            )
        }
        .map_err(|e| TrackerError::PlatformResource {
            reason: format!("CreateWaitableTimerExW(HIGH_RESOLUTION) failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(WaitableTimer { handle })
    }
}

/// High-resolution waitable timer, closed on drop.
pub struct WaitableTimer {
    handle: HANDLE,
}

impl OneShotTimer for WaitableTimer {
    #[track_caller]
    fn wait(&mut self, due: Duration) -> CoreResult<()> {
        // Negative due time is relative, in 100ns units.
        let due_time = -i64::try_from(due.as_nanos() / 100).unwrap_or(i64::MAX);

        // SAFETY: handle is a live timer owned by self; due_time outlives the call.
        unsafe { SetWaitableTimer(self.handle, &due_time, 0, None, None, false) }.map_err(|e| {
            TrackerError::PlatformResource {
                reason: format!("SetWaitableTimer failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        // SAFETY: handle is a live timer owned by self.
        let event = unsafe { WaitForSingleObject(self.handle, INFINITE) };

        if event != WAIT_OBJECT_0 {
            return Err(TrackerError::PlatformResource {
                reason: format!("WaitForSingleObject returned {:?}", event),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}

impl Drop for WaitableTimer {
    fn drop(&mut self) {
        // SAFETY: handle was created by CreateWaitableTimerExW and is closed once.
        if let Err(e) = unsafe { CloseHandle(self.handle) } {
            warn!(error = %e, "Failed to close waitable timer");
        }
    }
}
