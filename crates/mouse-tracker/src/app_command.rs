use uuid::Uuid;

/// Commands sent from the hotkey handler to the recorder loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Begin a recording; the session id tags every file and log line of it.
    StartRecording {
        /// Id of the new recording.
        session_id: Uuid,
    },
    /// End the recording with this id. Ignored if it already ended.
    StopRecording {
        /// Id of the recording to stop.
        session_id: Uuid,
    },
    /// Stop everything and leave the event loop.
    Shutdown,
}

/// Commands delivered to the main thread's event loop.
///
/// The main thread owns the hotkey manager, so process lifecycle events
/// flow through this enum via the event loop proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// Exit the event loop with code 0.
    Shutdown,
}
