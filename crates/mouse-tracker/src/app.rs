use crate::{
    AppCommand, PersistenceWorker, RecordingState, RecordingWorker, SessionEvent, UiCommand,
    config::Config,
};

use std::{path::PathBuf, sync::Arc};

use mouse_tracker_core::OutputNaming;
use tao::event_loop::EventLoopProxy;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Recorder state on the async runtime thread.
///
/// Sampling happens on the [`RecordingWorker`] thread and file writes on
/// the [`PersistenceWorker`]; this loop only routes commands and events.
/// Lifecycle requests for the main thread go through `ui_proxy`.
pub struct App {
    pub(crate) config: Config,
    pub(crate) state: Arc<Mutex<RecordingState>>,
    pub(crate) worker: RecordingWorker,
    pub(crate) persistence: PersistenceWorker,
    pub(crate) ui_proxy: EventLoopProxy<UiCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) session_rx: mpsc::Receiver<SessionEvent>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

/// Hands out numbered output paths, never the same one twice.
///
/// Saves are queued, so the directory can lag behind the paths already
/// handed out; a rescan only ever moves the counter forward.
#[derive(Debug)]
pub(crate) struct OutputSequence {
    naming: OutputNaming,
    next_index: u32,
}

impl OutputSequence {
    pub(crate) fn new(naming: OutputNaming) -> Self {
        Self {
            naming,
            next_index: 1,
        }
    }

    /// Skip past files that appeared in the directory since the last scan.
    pub(crate) fn refresh(&mut self) -> u32 {
        self.next_index = self.next_index.max(self.naming.next_index());
        self.next_index
    }

    /// Path for the next saved trajectory.
    pub(crate) fn claim(&mut self) -> PathBuf {
        let path = self.naming.path_for(self.next_index);
        self.next_index = self.next_index.saturating_add(1);
        path
    }
}

impl App {
    /// Run the recorder loop until shutdown.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> crate::AppResult<()> {
        info!(
            hotkey = %self.config.hotkey.preset,
            mode = ?self.config.recording.mode,
            output = ?self.config.output.directory,
            "Mouse Tracker recorder starting"
        );

        let mut outputs = OutputSequence::new(self.config.output.naming());

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut ctrl_c_armed = true;

        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::StartRecording { session_id } => {
                            self.start_recording(session_id, &mut outputs).await;
                        }
                        AppCommand::StopRecording { session_id } => {
                            info!(session_id = %session_id, "Stopping recording");
                            self.worker.stop(session_id);
                        }
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }

                Some(event) = self.session_rx.recv() => {
                    self.handle_session_event(event, &mut outputs).await;
                }

                result = &mut ctrl_c, if ctrl_c_armed => {
                    match result {
                        Ok(()) => {
                            info!("Interrupt received, shutting down");
                            break;
                        }
                        Err(e) => {
                            warn!(error = ?e, "Failed to listen for Ctrl-C");
                            ctrl_c_armed = false;
                        }
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        self.worker.stop_all();

        // Keep what already arrived; a closed receiver ends the worker.
        self.session_rx.close();
        while let Ok(event) = self.session_rx.try_recv() {
            self.handle_session_event(event, &mut outputs).await;
        }

        let App {
            worker,
            persistence,
            ui_proxy,
            shutdown_tx,
            ..
        } = self;

        if let Err(e) = tokio::task::spawn_blocking(move || worker.shutdown()).await {
            error!(error = ?e, "Recording worker shutdown task panicked");
        }

        persistence.shutdown().await;

        let _ = shutdown_tx.send(true);
        if ui_proxy.send_event(UiCommand::Shutdown).is_err() {
            debug!("Event loop already closed");
        }

        info!("Mouse Tracker recorder shut down successfully");

        Ok(())
    }

    #[instrument(skip(self, outputs))]
    async fn start_recording(&self, session_id: Uuid, outputs: &mut OutputSequence) {
        let next_index = outputs.refresh();

        match self.worker.start(session_id, self.config.recording.clone()) {
            Ok(()) => {
                info!(session_id = %session_id, next_index, "Recording started");
            }
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Failed to start recording");
                self.state.lock().await.complete(session_id);
            }
        }
    }

    #[instrument(skip(self, event, outputs))]
    async fn handle_session_event(&self, event: SessionEvent, outputs: &mut OutputSequence) {
        match event {
            SessionEvent::Captured {
                session_id,
                capture,
            } => {
                let path = outputs.claim();

                info!(
                    session_id = %session_id,
                    point_count = capture.trajectory.len(),
                    stop_reason = ?capture.stop_reason,
                    elapsed_ms = capture.elapsed.as_millis(),
                    path = ?path,
                    "Trajectory captured"
                );

                match self.persistence.submit(path, capture.trajectory).await {
                    Ok(receiver) => {
                        tokio::spawn(async move {
                            match receiver.await {
                                Ok(Ok(path)) => {
                                    info!(session_id = %session_id, path = ?path, "Trajectory written")
                                }
                                Ok(Err(e)) => {
                                    error!(session_id = %session_id, error = %e, "Failed to write trajectory")
                                }
                                Err(_) => {
                                    error!(session_id = %session_id, "Persistence worker dropped the save")
                                }
                            }
                        });
                    }
                    Err(e) => {
                        error!(session_id = %session_id, error = ?e, "Failed to queue trajectory");
                    }
                }
            }
            SessionEvent::Failed { session_id, reason } => {
                error!(session_id = %session_id, reason = %reason, "Recording failed");
            }
            SessionEvent::Finished { session_id } => {
                self.worker.release(session_id);
                if self.state.lock().await.complete(session_id) {
                    info!(session_id = %session_id, "Recording finished");
                } else {
                    debug!(session_id = %session_id, "Recording finished after stop");
                }
            }
        }
    }
}
