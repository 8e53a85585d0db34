//! One-shot capture and inspection commands.

use crate::{
    AppError, AppResult,
    cli::{
        InspectArgs, POINTS_USAGE, PointsArgs, PointsRequest, TRAJECTORY_USAGE, TrajectoryArgs,
        TrajectoryRequest,
    },
};

use std::{path::Path, process::ExitCode};

use mouse_tracker_core::{
    Capture, Pacing, SamplingConfig, SamplingEngine, SamplingMode, StopSignal, load_trajectory,
    save_trajectory,
};
use tracing::{error, info, instrument};

/// Capture succeeded and was written.
pub(crate) const EXIT_OK: u8 = 0;
/// Sampling failed.
pub(crate) const EXIT_CAPTURE_FAILED: u8 = 1;
/// Arguments were rejected.
pub(crate) const EXIT_USAGE: u8 = 2;
/// The file could not be written or read.
pub(crate) const EXIT_PERSISTENCE_FAILED: u8 = 3;

/// Report the outcome of a one-shot command and map it to an exit code.
pub(crate) fn finish(result: AppResult<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("{}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Process exit code for a failed command.
pub(crate) fn exit_code(error: &AppError) -> u8 {
    match error {
        AppError::InvalidArguments { .. } => EXIT_USAGE,
        e if e.is_persistence() => EXIT_PERSISTENCE_FAILED,
        _ => EXIT_CAPTURE_FAILED,
    }
}

/// `points`: fixed-count or timer-assisted capture written to one file.
pub(crate) fn points(args: &PointsArgs) -> AppResult<()> {
    capture_points(&args.resolve()?)
}

/// `trajectory`: idle-terminated capture written to one file.
pub(crate) fn trajectory(args: &TrajectoryArgs) -> AppResult<()> {
    capture_trajectory(&args.resolve()?)
}

/// Lines printed before a `points` capture starts.
pub(crate) fn points_banner(request: &PointsRequest) -> Vec<String> {
    let mut lines = Vec::new();
    if request.defaulted {
        lines.push(format!("Usage: {}", POINTS_USAGE));
    }
    lines.push(format!("Record count: {}", request.count));
    lines.push(format!("Filename: {}", request.filename.display()));
    lines
}

/// Lines printed before a `trajectory` capture starts.
pub(crate) fn trajectory_banner(request: &TrajectoryRequest) -> Vec<String> {
    let mut lines = Vec::new();
    if request.defaulted {
        lines.push(format!("Usage: {}", TRAJECTORY_USAGE));
    }
    lines.push(format!("Filename: {}", request.filename.display()));
    lines
}

#[instrument]
fn capture_points(request: &PointsRequest) -> AppResult<()> {
    for line in points_banner(request) {
        println!("{}", line);
    }

    let mode = match request.pacing {
        Pacing::BusyPoll => SamplingMode::FixedCount,
        Pacing::ProgrammedTimer => SamplingMode::TimerAssisted,
    };
    let config = SamplingConfig::fixed_count(request.count, request.delta_ms);

    capture_to_file(mode, &config, &request.filename)
}

#[instrument]
fn capture_trajectory(request: &TrajectoryRequest) -> AppResult<()> {
    for line in trajectory_banner(request) {
        println!("{}", line);
    }

    let (mode, config) = if request.continuous {
        (
            SamplingMode::ContinuousIdle,
            SamplingConfig::continuous_idle(request.delay_ms, request.delta_ms),
        )
    } else {
        (
            SamplingMode::IdleAfterFirstMove,
            SamplingConfig::idle_after_first_move(request.delay_ms, request.delta_ms),
        )
    };

    capture_to_file(mode, &config, &request.filename)
}

fn capture_to_file(mode: SamplingMode, config: &SamplingConfig, filename: &Path) -> AppResult<()> {
    let mut engine = SamplingEngine::system()?;
    let capture = engine.capture(mode, config, &StopSignal::new())?;

    print_summary(&capture);

    save_trajectory(filename, &capture.trajectory)?;

    info!(
        path = ?filename,
        point_count = capture.trajectory.len(),
        "Capture written"
    );

    Ok(())
}

fn print_summary(capture: &Capture) {
    println!(
        "Captured {} points in {} ms ({:?})",
        capture.trajectory.len(),
        capture.elapsed.as_millis(),
        capture.stop_reason
    );
}

/// `inspect`: summarize a stored trajectory.
#[instrument]
pub(crate) fn inspect(args: &InspectArgs) -> AppResult<()> {
    let loaded = load_trajectory(&args.filename)?;

    println!("File: {}", args.filename.display());
    println!("Points: {}", loaded.trajectory.len());

    match loaded.trajectory.bounds() {
        Some((min, max)) => println!("Bounds: {} .. {}", min, max),
        None => println!("Bounds: none"),
    }
    if let (Some(first), Some(last)) = (loaded.trajectory.first(), loaded.trajectory.last()) {
        println!("First: {}  Last: {}", first, last);
    }

    for warning in &loaded.warnings {
        println!("Warning: {}", warning);
    }

    Ok(())
}
