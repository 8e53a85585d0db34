use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Cloneable request flag for ending an unbounded session early.
///
/// The engine polls it once per cadence step in the idle-terminated
/// modes. Fixed-count sessions never look at it.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    /// Creates a signal in the not-requested state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks every holder of this signal to stop.
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    #[inline]
    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Returns the signal to the not-requested state.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}
