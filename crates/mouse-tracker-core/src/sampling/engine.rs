use crate::{
    Clock, CoreResult, CursorSource, MonotonicClock, OneShotTimer, Pacing, Point, PrecisionGuard,
    PrecisionPlatform, SamplingConfig, SamplingMode, SessionPlan, StopSignal, SystemCursor,
    Termination, TimingBase, Trajectory, platform::SystemPlatform, sampling::pacer::Pacer,
};

use std::time::Duration;

use tracing::{debug, info, instrument};

/// Why a sampling session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The fixed sample count was reached.
    CountReached,
    /// The cursor rested for the configured idle timeout.
    IdleTimeout,
    /// A stop was requested through the [`StopSignal`].
    Cancelled,
    /// The configured `max_samples` cap was reached.
    SampleLimit,
}

/// Result of one sampling session.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    /// Recorded points in capture order.
    pub trajectory: Trajectory,
    /// Why the session ended.
    pub stop_reason: StopReason,
    /// Cursor reads performed, including ones not appended.
    pub samples_taken: u64,
    /// Counter time from the first sample to the end of the session.
    pub elapsed: Duration,
}

/// Precision cursor sampler.
///
/// Each call to [`SamplingEngine::capture`] is a self-contained session:
/// acquire the precision context, sample, release, return. The engine
/// never spawns threads and keeps no state between sessions, so separate
/// engines on separate threads never interfere (apart from the
/// process-wide timer period, see [`crate::PrecisionGuard`]).
///
/// # Blocking
///
/// `capture` busy-waits or blocks the calling thread for the whole
/// session. Run it on a dedicated thread when the caller must stay
/// responsive.
pub struct SamplingEngine<C, K = MonotonicClock, P = SystemPlatform> {
    cursor: C,
    clock: K,
    platform: P,
}

impl SamplingEngine<SystemCursor, MonotonicClock, SystemPlatform> {
    /// Creates an engine wired to the OS cursor, clock and timer services.
    ///
    /// # Errors
    ///
    /// Returns error if the cursor backend cannot be reached.
    #[track_caller]
    #[instrument]
    pub fn system() -> CoreResult<Self> {
        let cursor = SystemCursor::new()?;

        Ok(Self::new(cursor, MonotonicClock::new(), SystemPlatform::new()))
    }
}

impl<C, K, P> SamplingEngine<C, K, P>
where
    C: CursorSource,
    K: Clock,
    P: PrecisionPlatform,
{
    /// Assembles an engine from explicit collaborators.
    pub fn new(cursor: C, clock: K, platform: P) -> Self {
        Self {
            cursor,
            clock,
            platform,
        }
    }

    /// Runs one sampling session.
    ///
    /// `stop` is polled once per cadence step by the idle-terminated modes
    /// and ignored by the fixed-count modes.
    ///
    /// # Errors
    ///
    /// - [`crate::TrackerError::Configuration`] if `config` lacks the
    ///   parameter `mode` needs. Raised before any resource is acquired.
    /// - [`crate::TrackerError::PlatformResource`] if the precision
    ///   context or the one-shot timer cannot be acquired.
    /// - [`crate::TrackerError::CursorUnavailable`] if a cursor read fails.
    ///   The partial trajectory is discarded.
    #[track_caller]
    #[instrument(skip(self, config, stop))]
    pub fn capture(
        &mut self,
        mode: SamplingMode,
        config: &SamplingConfig,
        stop: &StopSignal,
    ) -> CoreResult<Capture> {
        let plan = config.plan(mode)?;
        self.capture_plan(&plan, stop)
    }

    /// Runs one session from an already validated plan.
    ///
    /// # Errors
    ///
    /// Same as [`SamplingEngine::capture`], minus configuration errors.
    #[instrument(skip(self, stop), fields(mode = %plan.mode))]
    pub fn capture_plan(&mut self, plan: &SessionPlan, stop: &StopSignal) -> CoreResult<Capture> {
        // Released on every exit path, including `?` below and unwinding.
        let guard = PrecisionGuard::acquire(&self.platform)?;

        let base = TimingBase::new(self.clock.frequency(), plan.cadence_ms);

        let pacer = match plan.pacing {
            Pacing::BusyPoll => Pacer::BusyPoll,
            Pacing::ProgrammedTimer => Pacer::Timer {
                overhead_ticks: 0,
                timer: self.platform.create_timer()?,
            },
        };

        let capacity = match plan.termination {
            Termination::Count(count) => count as usize,
            _ => 0,
        };

        let mut session = Session {
            cursor: &mut self.cursor,
            clock: &self.clock,
            base,
            pacer,
            stop,
            max_samples: plan.max_samples,
            samples_taken: 0,
            trajectory: Trajectory::with_capacity(capacity),
        };

        info!(
            mode = %plan.mode,
            cadence_ms = plan.cadence_ms,
            pacing = ?plan.pacing,
            step_ticks = base.step_ticks(),
            timer_period_ms = ?guard.period_ms(),
            "Sampling session started"
        );

        session.calibrate()?;

        let (first_tick, stop_reason) = match plan.termination {
            Termination::Count(count) => session.run_fixed_count(count)?,
            Termination::IdleAfterFirstMove { timeout_ms } => {
                session.run_idle_after_first_move(timeout_ms)?
            }
            Termination::ContinuousIdle { timeout_ms } => session.run_continuous_idle(timeout_ms)?,
        };

        let end_tick = self.clock.now();
        let elapsed = first_tick
            .map(|start| base.ticks_to_duration(end_tick.saturating_sub(start)))
            .unwrap_or_default();

        drop(guard);

        let capture = Capture {
            trajectory: session.trajectory,
            stop_reason,
            samples_taken: session.samples_taken,
            elapsed,
        };

        info!(
            mode = %plan.mode,
            point_count = capture.trajectory.len(),
            samples_taken = capture.samples_taken,
            stop_reason = ?capture.stop_reason,
            elapsed_ms = capture.elapsed.as_millis(),
            "Sampling session finished"
        );

        Ok(capture)
    }

    /// Consumes the engine and returns its collaborators.
    pub fn into_parts(self) -> (C, K, P) {
        (self.cursor, self.clock, self.platform)
    }
}

/// Tracks the most recent movement for the idle stopping rule.
struct IdleTracker {
    last_point: Point,
    last_move_tick: u64,
    timeout_ms: f64,
}

impl IdleTracker {
    fn new(point: Point, tick: u64, timeout_ms: u32) -> Self {
        Self {
            last_point: point,
            last_move_tick: tick,
            timeout_ms: f64::from(timeout_ms),
        }
    }

    /// Feeds one sample; returns `true` once the cursor has rested for the
    /// full timeout. Any position change restarts the countdown.
    fn observe(&mut self, point: Point, tick: u64, base: &TimingBase) -> bool {
        if point == self.last_point {
            base.elapsed_ms(self.last_move_tick, tick) >= self.timeout_ms
        } else {
            self.last_point = point;
            self.last_move_tick = tick;
            false
        }
    }
}

/// State of one running session. Borrows the engine's collaborators so the
/// precision guard can hold the platform at the same time.
struct Session<'a, C, K, T: OneShotTimer> {
    cursor: &'a mut C,
    clock: &'a K,
    base: TimingBase,
    pacer: Pacer<T>,
    stop: &'a StopSignal,
    max_samples: Option<u64>,
    samples_taken: u64,
    trajectory: Trajectory,
}

impl<C: CursorSource, K: Clock, T: OneShotTimer> Session<'_, C, K, T> {
    /// Measures timer-pacing overhead with one throwaway sample and a
    /// zero-length timer wait. Approximate; redone every session.
    fn calibrate(&mut self) -> CoreResult<()> {
        if let Pacer::Timer {
            timer,
            overhead_ticks,
        } = &mut self.pacer
        {
            let start = self.clock.now();
            let _ = self.cursor.read_position()?;
            timer.wait(Duration::ZERO)?;
            *overhead_ticks = self.clock.now().saturating_sub(start);

            debug!(
                overhead_ticks = *overhead_ticks,
                overhead_us = self.base.ticks_to_duration(*overhead_ticks).as_micros(),
                "Timer overhead calibrated"
            );
        }

        Ok(())
    }

    #[inline]
    fn sample(&mut self) -> CoreResult<(u64, Point)> {
        let tick = self.clock.now();
        let point = self.cursor.read_position()?;
        self.samples_taken += 1;
        Ok((tick, point))
    }

    #[inline]
    fn pace(&mut self, step_start: u64) -> CoreResult<()> {
        self.pacer.finish_step(self.clock, &self.base, step_start)
    }

    /// Per-step check for the unbounded modes.
    #[inline]
    fn checkpoint(&self) -> Option<StopReason> {
        if self.stop.is_stop_requested() {
            return Some(StopReason::Cancelled);
        }

        match self.max_samples {
            Some(max) if self.samples_taken >= max => Some(StopReason::SampleLimit),
            _ => None,
        }
    }

    fn run_fixed_count(&mut self, count: u32) -> CoreResult<(Option<u64>, StopReason)> {
        let mut first_tick = None;

        for _ in 0..count {
            let (tick, point) = self.sample()?;
            first_tick.get_or_insert(tick);
            self.trajectory.push(point);
            self.pace(tick)?;
        }

        debug!(
            overhead_ticks = self.pacer.overhead_ticks(),
            "Fixed-count loop complete"
        );

        Ok((first_tick, StopReason::CountReached))
    }

    fn run_idle_after_first_move(
        &mut self,
        timeout_ms: u32,
    ) -> CoreResult<(Option<u64>, StopReason)> {
        if let Some(reason) = self.checkpoint() {
            return Ok((None, reason));
        }

        let (first_tick, initial) = self.sample()?;
        self.trajectory.push(initial);
        self.pace(first_tick)?;

        // Phase 1: the initial point is kept; identical samples are not.
        let mut tracker = loop {
            if let Some(reason) = self.checkpoint() {
                return Ok((Some(first_tick), reason));
            }

            let (tick, point) = self.sample()?;

            if point != initial {
                self.trajectory.push(point);
                self.pace(tick)?;
                debug!(from = %initial, to = %point, "First movement detected");
                break IdleTracker::new(point, tick, timeout_ms);
            }

            self.pace(tick)?;
        };

        // Phase 2: every sample is kept until the cursor rests long enough.
        let reason = self.record_until_idle(&mut tracker)?;

        Ok((Some(first_tick), reason))
    }

    fn run_continuous_idle(&mut self, timeout_ms: u32) -> CoreResult<(Option<u64>, StopReason)> {
        if let Some(reason) = self.checkpoint() {
            return Ok((None, reason));
        }

        let (first_tick, point) = self.sample()?;
        self.trajectory.push(point);
        self.pace(first_tick)?;

        let mut tracker = IdleTracker::new(point, first_tick, timeout_ms);
        let reason = self.record_until_idle(&mut tracker)?;

        Ok((Some(first_tick), reason))
    }

    fn record_until_idle(&mut self, tracker: &mut IdleTracker) -> CoreResult<StopReason> {
        loop {
            if let Some(reason) = self.checkpoint() {
                return Ok(reason);
            }

            let (tick, point) = self.sample()?;
            self.trajectory.push(point);

            if tracker.observe(point, tick, &self.base) {
                return Ok(StopReason::IdleTimeout);
            }

            self.pace(tick)?;
        }
    }
}
