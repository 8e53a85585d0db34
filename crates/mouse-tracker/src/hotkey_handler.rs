//! Global hotkey handler with recording state machine.
//!
//! Registers the configured preset as a global hotkey; each press toggles
//! between idle and recording. Uses async channels to talk to the recorder
//! loop.

use crate::{
    AppCommand, AppError, AppResult, RecordingState,
    config::{HotkeyPreset, RecorderMode},
};

use std::{
    panic::Location,
    sync::Arc,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Global hotkey handler with recording state machine.
pub struct HotkeyHandler {
    hotkey_id: u32,
    mode: RecorderMode,
    state: Arc<Mutex<RecordingState>>,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Register `preset` as the global hotkey.
    ///
    /// Must be called on a thread with a message pump (the main thread
    /// running the `tao` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkey to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkey(preset: HotkeyPreset) -> AppResult<(GlobalHotKeyManager, u32)> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let hotkey = preset.hotkey();

        manager
            .register(hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register {}: {}", preset, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(hotkey = %preset, "Global hotkey registered");

        Ok((manager, hotkey.id()))
    }

    /// Create a handler for a previously registered hotkey.
    ///
    /// `state` is shared with the recorder loop, which resets it when a
    /// recording ends on its own.
    pub fn new(
        hotkey_id: u32,
        mode: RecorderMode,
        state: Arc<Mutex<RecordingState>>,
        command_tx: mpsc::Sender<AppCommand>,
    ) -> Self {
        Self {
            hotkey_id,
            mode,
            state,
            command_tx,
        }
    }

    /// Run the hotkey handler event loop until shutdown is signalled.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // Shutdown: when event_rx is dropped the next blocking_send fails.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    // Presses only; releases would toggle twice.
                    if event.id == self.hotkey_id && event.state == HotKeyState::Pressed {
                        self.handle_hotkey_press().await?;
                    }
                }
            }
        }

        drop(event_rx);

        // The blocking task may sit in recv() until the next hotkey event.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    /// Toggle the recording state.
    ///
    /// The command is sent before the state changes, so a closed or full
    /// channel leaves the state untouched and the press can be retried.
    #[instrument(skip(self))]
    pub(crate) async fn handle_hotkey_press(&self) -> AppResult<()> {
        let mut state = self.state.lock().await;

        match *state {
            RecordingState::Idle => {
                let session_id = Uuid::new_v4();

                self.command_tx
                    .send(AppCommand::StartRecording { session_id })
                    .await
                    .map_err(|e| AppError::ChannelSendFailed {
                        message: format!("Failed to send StartRecording: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

                *state = RecordingState::Recording {
                    started_at: Instant::now(),
                    session_id,
                    mode: self.mode,
                };

                info!(session_id = %session_id, mode = ?self.mode, "Recording requested");
            }
            RecordingState::Recording {
                started_at,
                session_id,
                mode,
            } => {
                self.command_tx
                    .send(AppCommand::StopRecording { session_id })
                    .await
                    .map_err(|e| AppError::ChannelSendFailed {
                        message: format!("Failed to send StopRecording: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

                *state = RecordingState::Idle;

                match mode {
                    RecorderMode::Standard => info!(
                        session_id = %session_id,
                        duration_ms = started_at.elapsed().as_millis(),
                        "Stop requested, standard recording will be discarded"
                    ),
                    RecorderMode::Trajectory | RecorderMode::Continuous => info!(
                        session_id = %session_id,
                        mode = ?mode,
                        duration_ms = started_at.elapsed().as_millis(),
                        "Stop requested"
                    ),
                }
            }
        }

        Ok(())
    }
}
