//! Line-oriented trajectory format: one `"<x>;<y>"` line per point, in
//! capture order, newline-terminated.

use crate::{CoreResult, Point, TrackerError, Trajectory};

use std::{
    fmt, fs,
    io::{BufRead, BufReader, BufWriter, Write},
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Field separator between the coordinates of a point.
pub const FIELD_SEPARATOR: char = ';';

/// A stored line that could not be parsed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line number in the file.
    pub line_number: usize,
    /// Offending line, without its terminator.
    pub content: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid line {} in trajectory file: {:?}",
            self.line_number, self.content
        )
    }
}

/// Points read from a trajectory file plus the lines that were skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadedTrajectory {
    /// Successfully parsed points, in file order.
    pub trajectory: Trajectory,
    /// One entry per malformed, non-blank line.
    pub warnings: Vec<ParseWarning>,
}

/// Formats one point as a stored line, without terminator.
pub fn format_point(point: Point) -> String {
    format!("{}{}{}", point.x, FIELD_SEPARATOR, point.y)
}

/// Parses one stored line. Surrounding whitespace is ignored.
pub fn parse_point(line: &str) -> Option<Point> {
    let (x, y) = line.trim().split_once(FIELD_SEPARATOR)?;
    let x = x.trim().parse().ok()?;
    let y = y.trim().parse().ok()?;
    Some(Point::new(x, y))
}

/// Writes every point of `trajectory` to `writer`.
///
/// # Errors
///
/// Returns the first IO error raised by `writer`.
pub fn write_points<W: Write>(writer: &mut W, trajectory: &Trajectory) -> std::io::Result<()> {
    for point in trajectory {
        writeln!(writer, "{}{}{}", point.x, FIELD_SEPARATOR, point.y)?;
    }
    Ok(())
}

/// Parses points from `reader`, skipping blank and malformed lines.
///
/// Malformed lines are logged and reported; they never abort the load.
///
/// # Errors
///
/// Returns the IO error if reading fails; parse failures are not errors.
pub fn read_points<R: BufRead>(reader: R) -> std::io::Result<LoadedTrajectory> {
    let mut loaded = LoadedTrajectory::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;

        if line.trim().is_empty() {
            continue;
        }

        match parse_point(&line) {
            Some(point) => loaded.trajectory.push(point),
            None => {
                let warning = ParseWarning {
                    line_number: index + 1,
                    content: line,
                };
                warn!(
                    line_number = warning.line_number,
                    content = %warning.content,
                    "Invalid line in trajectory file"
                );
                loaded.warnings.push(warning);
            }
        }
    }

    Ok(loaded)
}

/// Saves `trajectory` to `path`.
///
/// Missing parent directories are created. The data is written to a
/// sibling temporary file, synced, then renamed over `path`, so a crash
/// mid-write never leaves a truncated trajectory behind.
///
/// # Errors
///
/// Returns [`TrackerError::Persistence`] if any filesystem step fails.
/// The in-memory trajectory is untouched and can be saved elsewhere.
#[track_caller]
#[instrument(skip(trajectory), fields(point_count = trajectory.len()))]
pub fn save_trajectory(path: &Path, trajectory: &Trajectory) -> CoreResult<()> {
    let location = ErrorLocation::from(Location::caller());
    let persistence = |source: std::io::Error, path: &Path| TrackerError::Persistence {
        path: path.to_path_buf(),
        source,
        location,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| persistence(e, parent))?;
            debug!(directory = ?parent, "Created output directory");
        }
    }

    replace_atomically(path, |writer| write_points(writer, trajectory))
        .map_err(|(failed, e)| persistence(e, &failed))?;

    info!(path = ?path, point_count = trajectory.len(), "Trajectory saved");

    Ok(())
}

/// Writes `path` through a sibling `.tmp` file: `write` fills it, then it
/// is flushed, synced and renamed over `path`.
///
/// On any failure after the temp file is created, the temp file is
/// removed. The error carries the path of the step that failed.
pub(crate) fn replace_atomically<F>(path: &Path, write: F) -> Result<(), (PathBuf, std::io::Error)>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> std::io::Result<()>,
{
    let temp_path = temp_path_for(path);

    let file = fs::File::create(&temp_path).map_err(|e| (temp_path.clone(), e))?;

    if let Err(e) = fill_and_sync(file, write) {
        let _ = fs::remove_file(&temp_path);
        return Err((temp_path, e));
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err((path.to_path_buf(), e));
    }

    Ok(())
}

fn fill_and_sync<F>(file: fs::File, write: F) -> std::io::Result<()>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> std::io::Result<()>,
{
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

/// Loads a trajectory from `path`.
///
/// # Errors
///
/// Returns [`TrackerError::Persistence`] if the file cannot be opened or
/// read. Malformed lines are reported in [`LoadedTrajectory::warnings`].
#[track_caller]
#[instrument]
pub fn load_trajectory(path: &Path) -> CoreResult<LoadedTrajectory> {
    let location = ErrorLocation::from(Location::caller());
    let persistence = |source: std::io::Error| TrackerError::Persistence {
        path: path.to_path_buf(),
        source,
        location,
    };

    let file = fs::File::open(path).map_err(persistence)?;
    let loaded = read_points(BufReader::new(file)).map_err(persistence)?;

    info!(
        path = ?path,
        point_count = loaded.trajectory.len(),
        warning_count = loaded.warnings.len(),
        "Trajectory loaded"
    );

    Ok(loaded)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
