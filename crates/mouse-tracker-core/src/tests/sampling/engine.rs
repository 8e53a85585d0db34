use crate::{
    CursorSource, Pacing, Point, SamplingConfig, SamplingEngine, SamplingMode, StopReason,
    StopSignal, TrackerError,
    tests::fakes::{
        FailingCursor, FakePlatform, FnCursor, ManualClock, PlatformCall, ScriptedCursor,
        StampingCursor, TICKS_PER_MS,
    },
};

use std::time::Duration;

// One step of the manual clock per `now()` call: 1ms.
// With a 10ms cadence every session step therefore spans exactly 11ms.
const ONE_MS_STEP: u64 = TICKS_PER_MS;

fn engine_with<C: CursorSource>(
    cursor: C,
    clock_step: u64,
) -> (SamplingEngine<C, ManualClock, FakePlatform>, FakePlatform) {
    let clock = ManualClock::new(clock_step);
    let platform = FakePlatform::new(&clock);
    let engine = SamplingEngine::new(cursor, clock, platform.clone());
    (engine, platform)
}

fn released(calls: &[PlatformCall]) -> bool {
    calls.ends_with(&[PlatformCall::EndPeriod(1), PlatformCall::RestorePriority])
}

/// WHAT: Fixed-count mode with a stationary cursor yields identical points
/// WHY: Five samples at 1ms cadence must be exactly five copies of the position
#[test]
#[allow(clippy::unwrap_used)]
fn given_fixed_cursor_when_sampling_five_points_then_five_identical_points() {
    // Given: A cursor parked at (640, 360)
    let point = Point::new(640, 360);
    let (mut engine, _) = engine_with(ScriptedCursor::fixed(point), 100);
    let config = SamplingConfig::fixed_count(5, 1);

    // When: Capturing in fixed-count mode
    let capture = engine
        .capture(SamplingMode::FixedCount, &config, &StopSignal::new())
        .unwrap();

    // Then: Exactly five identical points
    assert_eq!(capture.trajectory.len(), 5);
    assert!(capture.trajectory.iter().all(|p| *p == point));
    assert_eq!(capture.stop_reason, StopReason::CountReached);
    assert_eq!(capture.samples_taken, 5);
}

/// WHAT: Fixed-count output length always equals the requested count
/// WHY: Termination is purely count-based, independent of cursor motion
#[test]
#[allow(clippy::unwrap_used)]
fn given_various_counts_when_sampling_fixed_count_then_length_matches() {
    for count in [1u32, 2, 17, 250] {
        // Given: A cursor moving one pixel per read
        let cursor = FnCursor::new(|n| Point::new(n as i32, -(n as i32)));
        let (mut engine, _) = engine_with(cursor, 250);
        let config = SamplingConfig::fixed_count(count, 1);

        // When: Capturing
        let capture = engine
            .capture(SamplingMode::FixedCount, &config, &StopSignal::new())
            .unwrap();

        // Then: Length equals count and order is capture order
        assert_eq!(capture.trajectory.len(), count as usize);
        assert_eq!(capture.trajectory.first(), Some(Point::new(0, 0)));
        assert_eq!(
            capture.trajectory.last(),
            Some(Point::new(count as i32 - 1, 1 - count as i32))
        );
    }
}

/// WHAT: Fixed-count mode ignores stop requests
/// WHY: Bounded sessions run to completion; the host discards unwanted results
#[test]
#[allow(clippy::unwrap_used)]
fn given_stop_requested_when_sampling_fixed_count_then_runs_to_completion() {
    // Given: A stop signal that is already raised
    let (mut engine, _) = engine_with(ScriptedCursor::fixed(Point::new(1, 1)), 100);
    let stop = StopSignal::new();
    stop.request_stop();

    // When: Capturing four points
    let capture = engine
        .capture(
            SamplingMode::FixedCount,
            &SamplingConfig::fixed_count(4, 1),
            &stop,
        )
        .unwrap();

    // Then: All four samples are taken
    assert_eq!(capture.trajectory.len(), 4);
    assert_eq!(capture.stop_reason, StopReason::CountReached);
}

/// WHAT: Consecutive samples are spaced by at least one cadence step
/// WHY: Busy-poll pacing must never shorten a step
#[test]
#[allow(clippy::unwrap_used)]
fn given_stamping_cursor_when_sampling_then_spacing_at_least_cadence() {
    // Given: A cursor recording the counter at each read, 3ms cadence
    let clock = ManualClock::new(500);
    let platform = FakePlatform::new(&clock);
    let cursor = StampingCursor::new(ScriptedCursor::fixed(Point::new(0, 0)), clock.clone());
    let mut engine = SamplingEngine::new(cursor, clock, platform);

    // When: Capturing 20 points
    engine
        .capture(
            SamplingMode::FixedCount,
            &SamplingConfig::fixed_count(20, 3),
            &StopSignal::new(),
        )
        .unwrap();

    // Then: Stamps are non-decreasing and at least 3ms apart
    let (cursor, _, _) = engine.into_parts();
    assert_eq!(cursor.stamps.len(), 20);
    for pair in cursor.stamps.windows(2) {
        assert!(pair[1] >= pair[0]);
        assert!(pair[1] - pair[0] >= 3 * TICKS_PER_MS);
    }
}

/// WHAT: Idle-after-first-move waits for motion, then stops on rest
/// WHY: Phase 1 drops stationary samples; phase 2 keeps everything until idle
#[test]
#[allow(clippy::unwrap_used)]
fn given_cursor_moving_then_resting_when_recording_trajectory_then_gated_and_idle_terminated() {
    // Given: Cursor rests at a, moves through b and c, then rests at d
    let (a, b, c, d) = (
        Point::new(10, 10),
        Point::new(11, 12),
        Point::new(13, 15),
        Point::new(14, 17),
    );
    let cursor = ScriptedCursor::new(vec![a, a, a, b, c, d]);
    let (mut engine, _) = engine_with(cursor, ONE_MS_STEP);
    let config = SamplingConfig::idle_after_first_move(50, 10);

    // When: Recording with a 50ms idle timeout
    let capture = engine
        .capture(SamplingMode::IdleAfterFirstMove, &config, &StopSignal::new())
        .unwrap();

    // Then: Initial point, the movement, and d repeated until 50ms of rest
    assert_eq!(capture.stop_reason, StopReason::IdleTimeout);
    assert_eq!(capture.trajectory.points(), &[a, b, c, d, d, d, d, d, d]);
    assert_ne!(capture.trajectory[1], capture.trajectory[0]);
    assert_eq!(capture.samples_taken, 11);
}

/// WHAT: The last recorded points equal the point that triggered the idle stop
/// WHY: Idle detection compares against the last moved-to position
#[test]
#[allow(clippy::unwrap_used)]
fn given_idle_termination_when_recording_trajectory_then_tail_is_constant() {
    // Given: A short move then rest
    let cursor = ScriptedCursor::new(vec![
        Point::new(0, 0),
        Point::new(5, 5),
        Point::new(9, 9),
    ]);
    let (mut engine, _) = engine_with(cursor, ONE_MS_STEP);

    // When: Recording with a 20ms idle timeout
    let capture = engine
        .capture(
            SamplingMode::IdleAfterFirstMove,
            &SamplingConfig::idle_after_first_move(20, 10),
            &StopSignal::new(),
        )
        .unwrap();

    // Then: At least two trailing samples equal the final resting point
    let points = capture.trajectory.points();
    let tail = &points[points.len() - 2..];
    assert!(tail.iter().all(|p| *p == Point::new(9, 9)));
}

/// WHAT: A cursor that never moves keeps phase 1 running until the cap
/// WHY: Phase 1 records only the initial point; the sample cap bounds it
#[test]
#[allow(clippy::unwrap_used)]
fn given_stationary_cursor_when_waiting_for_first_move_then_sample_limit_with_one_point() {
    // Given: A parked cursor and a 50-sample cap
    let (mut engine, platform) = engine_with(ScriptedCursor::fixed(Point::new(3, 4)), 100);
    let config = SamplingConfig::idle_after_first_move(10, 1).with_max_samples(50);

    // When: Recording
    let capture = engine
        .capture(SamplingMode::IdleAfterFirstMove, &config, &StopSignal::new())
        .unwrap();

    // Then: Only the initial point is kept
    assert_eq!(capture.stop_reason, StopReason::SampleLimit);
    assert_eq!(capture.trajectory.points(), &[Point::new(3, 4)]);
    assert_eq!(capture.samples_taken, 50);
    assert!(released(&platform.calls()));
}

/// WHAT: Continuous-idle stops after an unbroken rest spanning the timeout
/// WHY: Recording starts at the first sample, without a movement gate
#[test]
#[allow(clippy::unwrap_used)]
fn given_stationary_cursor_when_recording_continuous_then_stops_after_timeout() {
    // Given: A parked cursor, 10ms cadence (11ms per step), 100ms timeout
    let (mut engine, _) = engine_with(ScriptedCursor::fixed(Point::new(7, 7)), ONE_MS_STEP);

    // When: Recording continuously
    let capture = engine
        .capture(
            SamplingMode::ContinuousIdle,
            &SamplingConfig::continuous_idle(100, 10),
            &StopSignal::new(),
        )
        .unwrap();

    // Then: The 11th sample is the first one 100ms past the seed
    assert_eq!(capture.stop_reason, StopReason::IdleTimeout);
    assert_eq!(capture.trajectory.len(), 11);
}

/// WHAT: A single differing sample restarts the idle countdown
/// WHY: Termination requires an unbroken run of identical samples
#[test]
#[allow(clippy::unwrap_used)]
fn given_single_differing_sample_when_recording_continuous_then_countdown_restarts() {
    // Given: p p p q p p ... (q differs once, at index 3)
    let (p, q) = (Point::new(100, 100), Point::new(101, 100));
    let mut script = vec![p; 3];
    script.push(q);
    script.push(p);
    let (mut engine, _) = engine_with(ScriptedCursor::new(script), ONE_MS_STEP);

    // When: Recording continuously with a 100ms timeout
    let capture = engine
        .capture(
            SamplingMode::ContinuousIdle,
            &SamplingConfig::continuous_idle(100, 10),
            &StopSignal::new(),
        )
        .unwrap();

    // Then: The countdown restarts at index 4, so the run ends at index 14
    assert_eq!(capture.stop_reason, StopReason::IdleTimeout);
    assert_eq!(capture.trajectory.len(), 15);
    assert_eq!(capture.trajectory[3], q);
    assert!(capture.trajectory.points()[4..].iter().all(|point| *point == p));
}

/// WHAT: A cursor changing every third sample never reaches the idle timeout
/// WHY: Idle runs of ~22ms never span the 100ms timeout
#[test]
#[allow(clippy::unwrap_used)]
fn given_cursor_changing_every_third_sample_when_recording_continuous_then_never_idle() {
    // Given: Position changes every 3rd sample; cap at 1000 samples
    let cursor = FnCursor::new(|n| Point::new((n / 3) as i32, 0));
    let (mut engine, _) = engine_with(cursor, ONE_MS_STEP);
    let config = SamplingConfig::continuous_idle(100, 10).with_max_samples(1000);

    // When: Recording continuously
    let capture = engine
        .capture(SamplingMode::ContinuousIdle, &config, &StopSignal::new())
        .unwrap();

    // Then: Only the cap ends the session
    assert_eq!(capture.stop_reason, StopReason::SampleLimit);
    assert_eq!(capture.trajectory.len(), 1000);
}

/// WHAT: A stop request raised mid-session ends the continuous loop
/// WHY: Unbounded modes poll the stop signal once per cadence step
#[test]
#[allow(clippy::unwrap_used)]
fn given_stop_requested_mid_session_when_recording_continuous_then_cancelled() {
    // Given: A moving cursor that raises the stop signal on its 6th read
    let stop = StopSignal::new();
    let trigger = stop.clone();
    let cursor = FnCursor::new(move |n| {
        if n == 5 {
            trigger.request_stop();
        }
        Point::new(n as i32, 0)
    });
    let (mut engine, platform) = engine_with(cursor, ONE_MS_STEP);

    // When: Recording continuously
    let capture = engine
        .capture(
            SamplingMode::ContinuousIdle,
            &SamplingConfig::continuous_idle(100, 10),
            &stop,
        )
        .unwrap();

    // Then: The session ends at the next step with six points, context released
    assert_eq!(capture.stop_reason, StopReason::Cancelled);
    assert_eq!(capture.trajectory.len(), 6);
    assert!(released(&platform.calls()));
}

/// WHAT: A stop requested before the session starts yields an empty capture
/// WHY: Cancellation is checked before the first sample of unbounded modes
#[test]
#[allow(clippy::unwrap_used)]
fn given_stop_already_requested_when_recording_trajectory_then_no_samples() {
    // Given: A raised stop signal
    let (mut engine, platform) = engine_with(ScriptedCursor::fixed(Point::new(0, 0)), 100);
    let stop = StopSignal::new();
    stop.request_stop();

    // When: Recording in idle-after-first-move mode
    let capture = engine
        .capture(
            SamplingMode::IdleAfterFirstMove,
            &SamplingConfig::idle_after_first_move(100, 1),
            &stop,
        )
        .unwrap();

    // Then: Nothing sampled, precision context still released
    assert_eq!(capture.stop_reason, StopReason::Cancelled);
    assert!(capture.trajectory.is_empty());
    assert_eq!(capture.samples_taken, 0);
    assert!(released(&platform.calls()));
}

/// WHAT: Successful session acquires then releases the precision context
/// WHY: Leaked timer-period requests degrade timer behaviour system-wide
#[test]
#[allow(clippy::unwrap_used)]
fn given_successful_session_when_finished_then_precision_context_released_in_order() {
    // Given: Platform reporting a 1ms minimum period
    let (mut engine, platform) = engine_with(ScriptedCursor::fixed(Point::new(0, 0)), 100);

    // When: Capturing
    engine
        .capture(
            SamplingMode::FixedCount,
            &SamplingConfig::fixed_count(3, 1),
            &StopSignal::new(),
        )
        .unwrap();

    // Then: Acquire and release calls are symmetric
    assert_eq!(
        platform.calls(),
        vec![
            PlatformCall::RaisePriority,
            PlatformCall::BeginPeriod(1),
            PlatformCall::EndPeriod(1),
            PlatformCall::RestorePriority,
        ]
    );
}

/// WHAT: Cursor failure aborts the session but still releases the context
/// WHY: Release is unconditional; no partial trajectory is returned
#[test]
fn given_failing_cursor_when_capturing_then_error_and_context_released() {
    // Given: A cursor failing on its 4th read
    let (mut engine, platform) = engine_with(FailingCursor::after(3), 100);

    // When: Capturing 10 points
    let result = engine.capture(
        SamplingMode::FixedCount,
        &SamplingConfig::fixed_count(10, 1),
        &StopSignal::new(),
    );

    // Then: CursorUnavailable, and the context was released
    assert!(matches!(result, Err(TrackerError::CursorUnavailable { .. })));
    assert!(released(&platform.calls()));
}

/// WHAT: Priority elevation failure aborts before any sample
/// WHY: Platform resource errors are fatal for the session
#[test]
fn given_priority_failure_when_capturing_then_platform_error_without_sampling() {
    // Given: A platform refusing to raise priority
    let clock = ManualClock::new(100);
    let mut platform = FakePlatform::new(&clock);
    platform.fail_priority = true;
    let mut engine = SamplingEngine::new(
        ScriptedCursor::fixed(Point::new(0, 0)),
        clock,
        platform.clone(),
    );

    // When: Capturing
    let result = engine.capture(
        SamplingMode::FixedCount,
        &SamplingConfig::fixed_count(3, 1),
        &StopSignal::new(),
    );

    // Then: PlatformResource error, cursor never read, nothing to release
    assert!(matches!(result, Err(TrackerError::PlatformResource { .. })));
    let (cursor, _, _) = engine.into_parts();
    assert_eq!(cursor.reads(), 0);
    assert!(platform.calls().is_empty());
}

/// WHAT: Timer-period failure restores the already raised priority
/// WHY: Partial acquisition must release exactly what was acquired
#[test]
fn given_period_failure_when_capturing_then_priority_restored() {
    // Given: A platform refusing the timer period
    let clock = ManualClock::new(100);
    let mut platform = FakePlatform::new(&clock);
    platform.fail_period = true;
    let mut engine = SamplingEngine::new(
        ScriptedCursor::fixed(Point::new(0, 0)),
        clock,
        platform.clone(),
    );

    // When: Capturing
    let result = engine.capture(
        SamplingMode::ContinuousIdle,
        &SamplingConfig::continuous_idle(10, 1),
        &StopSignal::new(),
    );

    // Then: Error, and priority was restored without a period release
    assert!(matches!(result, Err(TrackerError::PlatformResource { .. })));
    assert_eq!(
        platform.calls(),
        vec![PlatformCall::RaisePriority, PlatformCall::RestorePriority]
    );
}

/// WHAT: Timer-assisted mode yields count points and discards the warm-up
/// WHY: Same output contract as fixed-count, different pacing
#[test]
#[allow(clippy::unwrap_used)]
fn given_timer_assisted_mode_when_capturing_then_count_points_and_timer_paced() {
    // Given: 1 tick (1us) per clock read, 10ms cadence
    let (mut engine, platform) = engine_with(ScriptedCursor::fixed(Point::new(2, 3)), 1);

    // When: Capturing five points
    let capture = engine
        .capture(
            SamplingMode::TimerAssisted,
            &SamplingConfig::fixed_count(5, 10),
            &StopSignal::new(),
        )
        .unwrap();

    // Then: Five points; one zero-length calibration wait then five
    // waits of budget (10000us) - sampling (1us) - overhead (1us)
    assert_eq!(capture.trajectory.len(), 5);
    let calls = platform.calls();
    let waits: Vec<Duration> = calls
        .iter()
        .filter_map(|c| match c {
            PlatformCall::Wait(d) => Some(*d),
            _ => None,
        })
        .collect();
    assert_eq!(waits.len(), 6);
    assert_eq!(waits[0], Duration::ZERO);
    assert!(
        waits[1..]
            .iter()
            .all(|d| *d == Duration::from_micros(9_998))
    );
    assert!(calls.contains(&PlatformCall::CreateTimer));
    assert!(released(&calls));

    let (cursor, _, _) = engine.into_parts();
    assert_eq!(cursor.reads(), 6);
}

/// WHAT: Fixed-count mode honours a programmed-timer pacing option
/// WHY: Both pacing strategies sit behind one interface
#[test]
#[allow(clippy::unwrap_used)]
fn given_fixed_count_with_timer_pacing_when_capturing_then_timer_used() {
    // Given: Fixed-count config switched to programmed-timer pacing
    let (mut engine, platform) = engine_with(ScriptedCursor::fixed(Point::new(0, 0)), 1);
    let config = SamplingConfig::fixed_count(3, 2).with_pacing(Pacing::ProgrammedTimer);

    // When: Capturing
    let capture = engine
        .capture(SamplingMode::FixedCount, &config, &StopSignal::new())
        .unwrap();

    // Then: Three points, timer created
    assert_eq!(capture.trajectory.len(), 3);
    assert!(platform.calls().contains(&PlatformCall::CreateTimer));
}

/// WHAT: Timer creation failure releases the precision context
/// WHY: Release must run on every early exit
#[test]
fn given_timer_failure_when_capturing_timer_assisted_then_context_released() {
    // Given: A platform unable to create timers
    let clock = ManualClock::new(1);
    let mut platform = FakePlatform::new(&clock);
    platform.fail_timer = true;
    let mut engine = SamplingEngine::new(
        ScriptedCursor::fixed(Point::new(0, 0)),
        clock,
        platform.clone(),
    );

    // When: Capturing with timer pacing
    let result = engine.capture(
        SamplingMode::TimerAssisted,
        &SamplingConfig::fixed_count(3, 1),
        &StopSignal::new(),
    );

    // Then: PlatformResource error; acquire and release are paired
    assert!(matches!(result, Err(TrackerError::PlatformResource { .. })));
    assert_eq!(
        platform.calls(),
        vec![
            PlatformCall::RaisePriority,
            PlatformCall::BeginPeriod(1),
            PlatformCall::EndPeriod(1),
            PlatformCall::RestorePriority,
        ]
    );
}

/// WHAT: Missing mode parameter fails before any platform call
/// WHY: Configuration errors surface before loop entry
#[test]
fn given_missing_target_count_when_capturing_fixed_count_then_configuration_error() {
    // Given: An idle-mode config used for a fixed-count session
    let (mut engine, platform) = engine_with(ScriptedCursor::fixed(Point::new(0, 0)), 100);
    let config = SamplingConfig::idle_after_first_move(100, 1);

    // When: Capturing in fixed-count mode
    let result = engine.capture(SamplingMode::FixedCount, &config, &StopSignal::new());

    // Then: Configuration error, platform untouched
    assert!(matches!(result, Err(TrackerError::Configuration { .. })));
    assert!(platform.calls().is_empty());
}
