use crate::config::RecorderMode;

use std::time::Instant;

use uuid::Uuid;

/// Recorder state shared by the hotkey handler and the recorder loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// No recording in progress.
    Idle,
    /// A recording is in progress on the worker thread.
    Recording {
        /// When the hotkey started it.
        started_at: Instant,
        /// Unique id for log correlation.
        session_id: Uuid,
        /// Session shape it was started with.
        mode: RecorderMode,
    },
}

impl RecordingState {
    /// Id of the running recording, if any.
    pub fn session_id(&self) -> Option<Uuid> {
        match self {
            RecordingState::Idle => None,
            RecordingState::Recording { session_id, .. } => Some(*session_id),
        }
    }

    /// Return to idle when the worker reports that `session_id` ended on
    /// its own (standard and trajectory recordings end without a second
    /// key press). Returns whether the state changed.
    pub fn complete(&mut self, session_id: Uuid) -> bool {
        if self.session_id() == Some(session_id) {
            *self = RecordingState::Idle;
            true
        } else {
            false
        }
    }
}
