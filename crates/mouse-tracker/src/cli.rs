//! Command-line interface.

use crate::{AppError, AppResult};

use std::{panic::Location, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use error_location::ErrorLocation;
use mouse_tracker_core::Pacing;

/// Fixed-count defaults.
pub(crate) const DEFAULT_COUNT: u32 = 10_000;
/// Idle-timeout default for trajectory captures.
pub(crate) const DEFAULT_DELAY_MS: u32 = 500;
/// Output file default.
pub(crate) const DEFAULT_FILENAME: &str = "./cursor_data";
/// Cadence default.
pub(crate) const DEFAULT_DELTA_MS: u32 = 1;

/// Usage line of the `points` subcommand.
pub(crate) const POINTS_USAGE: &str = "mouse-tracker points <count> <filename> <delta>";
/// Usage line of the `trajectory` subcommand.
pub(crate) const TRAJECTORY_USAGE: &str = "mouse-tracker trajectory <delay> <filename> <delta>";

/// Mouse Tracker - precision cursor sampling
#[derive(Parser, Debug)]
#[command(name = "mouse-tracker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a fixed number of cursor points
    Points(PointsArgs),

    /// Record a mouse trajectory until the cursor rests
    Trajectory(TrajectoryArgs),

    /// Run the hotkey-driven recorder
    Record(RecordArgs),

    /// Summarize a stored trajectory file
    Inspect(InspectArgs),
}

/// Pacing strategy selectable on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacingArg {
    /// Spin on the high-resolution counter
    #[default]
    Busy,
    /// Sleep on a one-shot high-resolution timer
    Timer,
}

impl From<PacingArg> for Pacing {
    fn from(arg: PacingArg) -> Self {
        match arg {
            PacingArg::Busy => Pacing::BusyPoll,
            PacingArg::Timer => Pacing::ProgrammedTimer,
        }
    }
}

/// `points` arguments. Positionals are all-or-nothing.
#[derive(Args, Debug, Clone)]
pub struct PointsArgs {
    /// Number of points to record
    pub count: Option<u32>,

    /// Output filename
    pub filename: Option<PathBuf>,

    /// Time between samples in ms
    pub delta: Option<u32>,

    /// Pacing strategy
    #[arg(long, value_enum, default_value_t = PacingArg::Busy)]
    pub pacing: PacingArg,
}

/// `trajectory` arguments. Positionals are all-or-nothing.
#[derive(Args, Debug, Clone)]
pub struct TrajectoryArgs {
    /// Idle time in ms that ends the recording
    pub delay: Option<u32>,

    /// Output filename
    pub filename: Option<PathBuf>,

    /// Time between samples in ms
    pub delta: Option<u32>,

    /// Record from the first sample instead of waiting for movement
    #[arg(long)]
    pub continuous: bool,
}

/// `record` arguments.
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// `inspect` arguments.
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Trajectory file to read
    pub filename: PathBuf,
}

/// Fully resolved `points` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsRequest {
    /// Number of points.
    pub count: u32,
    /// Output file.
    pub filename: PathBuf,
    /// Cadence in ms.
    pub delta_ms: u32,
    /// Pacing strategy.
    pub pacing: Pacing,
    /// Whether the built-in defaults were used.
    pub defaulted: bool,
}

/// Fully resolved `trajectory` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrajectoryRequest {
    /// Idle timeout in ms.
    pub delay_ms: u32,
    /// Output file.
    pub filename: PathBuf,
    /// Cadence in ms.
    pub delta_ms: u32,
    /// Skip the first-move gate.
    pub continuous: bool,
    /// Whether the built-in defaults were used.
    pub defaulted: bool,
}

impl PointsArgs {
    /// Apply defaults or validate the explicit positional set.
    #[track_caller]
    pub fn resolve(&self) -> AppResult<PointsRequest> {
        let explicit = all_or_nothing(self.count, self.filename.clone(), self.delta, POINTS_USAGE)?;
        let defaulted = explicit.is_none();
        let (count, filename, delta_ms) = explicit.unwrap_or_else(|| {
            (
                DEFAULT_COUNT,
                PathBuf::from(DEFAULT_FILENAME),
                DEFAULT_DELTA_MS,
            )
        });

        Ok(PointsRequest {
            count,
            filename,
            delta_ms,
            pacing: self.pacing.into(),
            defaulted,
        })
    }
}

impl TrajectoryArgs {
    /// Apply defaults or validate the explicit positional set.
    #[track_caller]
    pub fn resolve(&self) -> AppResult<TrajectoryRequest> {
        let explicit = all_or_nothing(
            self.delay,
            self.filename.clone(),
            self.delta,
            TRAJECTORY_USAGE,
        )?;
        let defaulted = explicit.is_none();
        let (delay_ms, filename, delta_ms) = explicit.unwrap_or_else(|| {
            (
                DEFAULT_DELAY_MS,
                PathBuf::from(DEFAULT_FILENAME),
                DEFAULT_DELTA_MS,
            )
        });

        Ok(TrajectoryRequest {
            delay_ms,
            filename,
            delta_ms,
            continuous: self.continuous,
            defaulted,
        })
    }
}

#[track_caller]
fn all_or_nothing<A, B, C>(
    a: Option<A>,
    b: Option<B>,
    c: Option<C>,
    usage: &str,
) -> AppResult<Option<(A, B, C)>> {
    match (a, b, c) {
        (Some(a), Some(b), Some(c)) => Ok(Some((a, b, c))),
        (None, None, None) => Ok(None),
        _ => Err(AppError::InvalidArguments {
            reason: format!("expected all three positional arguments or none. Usage: {}", usage),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}
