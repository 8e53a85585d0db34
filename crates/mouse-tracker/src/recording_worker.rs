//! Dedicated sampling thread for the recorder.
//!
//! Sessions busy-wait at time-critical priority, so they never run on the
//! async runtime. The worker owns the engine, runs one recording at a
//! time, and reports back over a tokio channel.

use crate::{
    AppError, AppResult,
    config::{RecorderMode, RecordingConfig},
};

use std::{
    collections::HashMap,
    panic::Location,
    sync::{Mutex, mpsc as std_mpsc},
    thread::{self, JoinHandle},
};

use error_location::ErrorLocation;
use mouse_tracker_core::{
    Capture, Clock, CoreResult, CursorSource, PrecisionPlatform, SamplingEngine, StopReason,
    StopSignal,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, info_span, instrument, warn};
use uuid::Uuid;

/// Progress of a recording, reported from the worker thread.
#[derive(Debug)]
pub enum SessionEvent {
    /// One session of the recording produced a trajectory.
    Captured {
        /// Recording the session belongs to.
        session_id: Uuid,
        /// The session result.
        capture: Capture,
    },
    /// A session failed; the recording ends.
    Failed {
        /// Recording the session belongs to.
        session_id: Uuid,
        /// Display form of the error.
        reason: String,
    },
    /// The recording ended. No further events carry this id.
    Finished {
        /// Recording that ended.
        session_id: Uuid,
    },
}

enum WorkerRequest {
    Start {
        session_id: Uuid,
        recording: RecordingConfig,
        stop: StopSignal,
    },
    Shutdown,
}

/// Handle to the sampling thread.
///
/// Every recording gets its own [`StopSignal`], so a stop aimed at one
/// recording never leaks into another, whether it is running or queued.
pub struct RecordingWorker {
    requests: std_mpsc::Sender<WorkerRequest>,
    stops: Mutex<HashMap<Uuid, StopSignal>>,
    handle: Option<JoinHandle<()>>,
}

impl RecordingWorker {
    /// Spawn the worker thread.
    ///
    /// `factory` builds the engine on the worker thread itself, so the
    /// cursor backend never crosses threads. If it fails, every recording
    /// request is answered with [`SessionEvent::Failed`].
    #[track_caller]
    #[instrument(skip_all)]
    pub fn spawn<F, C, K, P>(factory: F, events: mpsc::Sender<SessionEvent>) -> AppResult<Self>
    where
        F: FnOnce() -> CoreResult<SamplingEngine<C, K, P>> + Send + 'static,
        C: CursorSource + 'static,
        K: Clock + 'static,
        P: PrecisionPlatform + 'static,
    {
        let (requests, request_rx) = std_mpsc::channel();

        let handle = thread::Builder::new()
            .name("recording-worker".to_string())
            .spawn(move || {
                let engine = factory().map_err(|e| {
                    error!(error = %e, "Failed to create sampling engine");
                    e.to_string()
                });
                serve(engine, request_rx, events);
            })?;

        info!("Recording worker started");

        Ok(Self {
            requests,
            stops: Mutex::new(HashMap::new()),
            handle: Some(handle),
        })
    }

    /// Queue a recording. Runs after the current one, if any, has ended.
    #[track_caller]
    pub fn start(&self, session_id: Uuid, recording: RecordingConfig) -> AppResult<()> {
        let location = ErrorLocation::from(Location::caller());
        let stop = StopSignal::new();

        self.requests
            .send(WorkerRequest::Start {
                session_id,
                recording,
                stop: stop.clone(),
            })
            .map_err(|_| AppError::WorkerUnavailable {
                reason: "Recording worker has exited".to_string(),
                location,
            })?;

        if let Ok(mut stops) = self.stops.lock() {
            stops.insert(session_id, stop);
        }

        Ok(())
    }

    /// Ask recording `session_id` to stop at its next cadence step.
    ///
    /// A recording still waiting in the queue is skipped when it comes up.
    /// Fixed-count sessions run to completion; their result is discarded.
    pub fn stop(&self, session_id: Uuid) {
        match self.stops.lock() {
            Ok(stops) => match stops.get(&session_id) {
                Some(stop) => stop.request_stop(),
                None => debug!(session_id = %session_id, "No such recording to stop"),
            },
            Err(_) => warn!("Stop signal table poisoned"),
        }
    }

    /// Forget the stop signal of a recording that has ended.
    pub fn release(&self, session_id: Uuid) {
        if let Ok(mut stops) = self.stops.lock() {
            stops.remove(&session_id);
        }
    }

    /// Ask every running or queued recording to stop.
    pub fn stop_all(&self) {
        if let Ok(stops) = self.stops.lock() {
            stops.values().for_each(StopSignal::request_stop);
        }
    }

    /// Stop every recording, end the thread and wait for it.
    ///
    /// Blocks until the current session returns.
    pub fn shutdown(mut self) {
        self.stop_all();
        let _ = self.requests.send(WorkerRequest::Shutdown);

        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(()) => info!("Recording worker stopped"),
                Err(_) => warn!("Recording worker panicked"),
            }
        }
    }
}

fn serve<C, K, P>(
    mut engine: Result<SamplingEngine<C, K, P>, String>,
    requests: std_mpsc::Receiver<WorkerRequest>,
    events: mpsc::Sender<SessionEvent>,
) where
    C: CursorSource,
    K: Clock,
    P: PrecisionPlatform,
{
    while let Ok(request) = requests.recv() {
        let (session_id, recording, stop) = match request {
            WorkerRequest::Start {
                session_id,
                recording,
                stop,
            } => (session_id, recording, stop),
            WorkerRequest::Shutdown => break,
        };

        let span = info_span!("recording", session_id = %session_id);
        let _entered = span.enter();

        let delivered = match engine.as_mut() {
            Ok(_) if stop.is_stop_requested() => {
                debug!("Stopped before it started, recording skipped");
                true
            }
            Ok(engine) => record(engine, session_id, &recording, &stop, &events),
            Err(reason) => events
                .blocking_send(SessionEvent::Failed {
                    session_id,
                    reason: reason.clone(),
                })
                .is_ok(),
        };

        if !delivered
            || events
                .blocking_send(SessionEvent::Finished { session_id })
                .is_err()
        {
            debug!("Session event receiver closed");
            break;
        }
    }
}

/// Run one recording. Returns `false` once the event receiver is gone.
fn record<C, K, P>(
    engine: &mut SamplingEngine<C, K, P>,
    session_id: Uuid,
    recording: &RecordingConfig,
    stop: &StopSignal,
    events: &mpsc::Sender<SessionEvent>,
) -> bool
where
    C: CursorSource,
    K: Clock,
    P: PrecisionPlatform,
{
    let (mode, config) = recording.session();
    let repeat = recording.mode == RecorderMode::Continuous;

    loop {
        let capture = match engine.capture(mode, &config, stop) {
            Ok(capture) => capture,
            Err(e) => {
                error!(error = %e, "Sampling session failed");
                return events
                    .blocking_send(SessionEvent::Failed {
                        session_id,
                        reason: e.to_string(),
                    })
                    .is_ok();
            }
        };

        if stop.is_stop_requested() || capture.stop_reason == StopReason::Cancelled {
            debug!(
                point_count = capture.trajectory.len(),
                "Stopped by hotkey, session discarded"
            );
            return true;
        }

        if capture.trajectory.is_empty() {
            debug!("Empty session discarded");
        } else if events
            .blocking_send(SessionEvent::Captured {
                session_id,
                capture,
            })
            .is_err()
        {
            return false;
        }

        if !repeat {
            return true;
        }
    }
}
