use std::time::{Duration, Instant};

/// Monotonic high-resolution counter.
///
/// Every elapsed-time computation in a session goes through this trait;
/// wall-clock time is never consulted.
pub trait Clock {
    /// Counter ticks per second. Queried once per session.
    fn frequency(&self) -> u64;

    /// Current counter value. Must never decrease.
    fn now(&self) -> u64;
}

/// [`Clock`] backed by [`Instant`], ticking in nanoseconds.
///
/// On Windows `Instant` reads `QueryPerformanceCounter`; on Linux and
/// macOS it reads `CLOCK_MONOTONIC` / `mach_absolute_time`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose counter starts at zero now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn frequency(&self) -> u64 {
        1_000_000_000
    }

    #[inline]
    fn now(&self) -> u64 {
        // u64 nanoseconds overflow after ~584 years of uptime.
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Tick conversions derived from a clock frequency and a cadence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingBase {
    frequency: u64,
    ticks_per_ms: f64,
    step_ticks: u64,
}

impl TimingBase {
    /// Derives the per-step tick budget for `cadence_ms`.
    pub fn new(frequency: u64, cadence_ms: u32) -> Self {
        let ticks_per_ms = frequency as f64 / 1000.0;

        Self {
            frequency,
            ticks_per_ms,
            step_ticks: (ticks_per_ms * f64::from(cadence_ms)) as u64,
        }
    }

    /// Counter ticks per second.
    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    /// Counter ticks per millisecond.
    pub fn ticks_per_ms(&self) -> f64 {
        self.ticks_per_ms
    }

    /// Tick budget of one cadence step.
    pub fn step_ticks(&self) -> u64 {
        self.step_ticks
    }

    /// Milliseconds elapsed between two counter values.
    ///
    /// Returns 0 if `end` precedes `start`.
    pub fn elapsed_ms(&self, start: u64, end: u64) -> f64 {
        end.saturating_sub(start) as f64 / self.ticks_per_ms
    }

    /// Converts a tick count into a [`Duration`].
    pub fn ticks_to_duration(&self, ticks: u64) -> Duration {
        if self.frequency == 0 {
            return Duration::ZERO;
        }

        // Widen to u128 so large tick counts do not overflow the multiply.
        let nanos = u128::from(ticks) * 1_000_000_000 / u128::from(self.frequency);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}
