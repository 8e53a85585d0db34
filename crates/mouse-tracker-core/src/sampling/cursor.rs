use crate::{CoreResult, Point, TrackerError};

use std::panic::Location;

use enigo::{Enigo, Mouse, Settings};
use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// Supplier of the current pointer position.
///
/// Implementations are expected to answer in constant time without
/// blocking; the engine calls this once per cadence step.
pub trait CursorSource {
    /// Reads the pointer position in screen-pixel coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::CursorUnavailable`] if the OS query fails.
    fn read_position(&mut self) -> CoreResult<Point>;
}

impl<C: CursorSource + ?Sized> CursorSource for &mut C {
    fn read_position(&mut self) -> CoreResult<Point> {
        (**self).read_position()
    }
}

impl<C: CursorSource + ?Sized> CursorSource for Box<C> {
    fn read_position(&mut self) -> CoreResult<Point> {
        (**self).read_position()
    }
}

/// [`CursorSource`] reading the OS pointer through `enigo`.
///
/// `Enigo` is not `Send` on every platform, so construct this on the
/// thread that runs the sampling session.
pub struct SystemCursor {
    enigo: Enigo,
}

impl SystemCursor {
    /// Connects to the platform input backend.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::CursorUnavailable`] if the backend cannot be
    /// reached (e.g. no display server, missing accessibility permission).
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| {
            TrackerError::CursorUnavailable {
                reason: format!("Failed to connect to input backend: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        debug!("System cursor source initialized");

        Ok(Self { enigo })
    }
}

impl CursorSource for SystemCursor {
    #[inline]
    #[track_caller]
    fn read_position(&mut self) -> CoreResult<Point> {
        self.enigo
            .location()
            .map(Point::from)
            .map_err(|e| TrackerError::CursorUnavailable {
                reason: format!("Failed to query cursor location: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
