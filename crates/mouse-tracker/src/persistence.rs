//! Background trajectory writer.
//!
//! A single task drains a bounded queue of save jobs; each file write runs
//! on the blocking pool. Callers get a `oneshot` handle for the outcome
//! and never wait on the filesystem themselves.

use crate::{AppError, AppResult};

use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use mouse_tracker_core::{Trajectory, save_trajectory};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument};

/// Default queue capacity.
pub(crate) const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Outcome of one save, delivered through the `oneshot` handle.
pub type SaveResult = AppResult<PathBuf>;

struct SaveJob {
    path: PathBuf,
    trajectory: Trajectory,
    reply: oneshot::Sender<SaveResult>,
}

/// Owner of the writer task.
pub struct PersistenceWorker {
    jobs: mpsc::Sender<SaveJob>,
    task: JoinHandle<()>,
}

impl PersistenceWorker {
    /// Spawn the writer task on the current runtime.
    #[track_caller]
    pub fn spawn(capacity: usize) -> Self {
        let location = ErrorLocation::from(Location::caller());
        let (jobs, mut job_rx) = mpsc::channel::<SaveJob>(capacity.max(1));

        let task = tokio::spawn(async move {
            while let Some(job) = job_rx.recv().await {
                let SaveJob {
                    path,
                    trajectory,
                    reply,
                } = job;

                let result = match tokio::task::spawn_blocking(move || {
                    save_trajectory(&path, &trajectory).map(|()| path)
                })
                .await
                {
                    Ok(result) => result.map_err(AppError::from),
                    Err(e) => Err(AppError::WorkerUnavailable {
                        reason: format!("Save task failed: {}", e),
                        location,
                    }),
                };

                if reply.send(result).is_err() {
                    debug!("Save result dropped, caller gone");
                }
            }

            debug!("Persistence queue drained");
        });

        Self { jobs, task }
    }

    /// Queue `trajectory` for writing to `path`.
    ///
    /// Waits for queue space when the queue is full.
    #[instrument(skip(self, trajectory), fields(point_count = trajectory.len()))]
    pub async fn submit(
        &self,
        path: PathBuf,
        trajectory: Trajectory,
    ) -> AppResult<oneshot::Receiver<SaveResult>> {
        let location = ErrorLocation::from(Location::caller());
        let (reply, receiver) = oneshot::channel();

        self.jobs
            .send(SaveJob {
                path,
                trajectory,
                reply,
            })
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Persistence queue closed: {}", e),
                location,
            })?;

        Ok(receiver)
    }

    /// Close the queue, finish every queued save, then stop the task.
    #[instrument(skip(self))]
    pub async fn shutdown(self) {
        drop(self.jobs);

        match self.task.await {
            Ok(()) => info!("Persistence worker stopped"),
            Err(e) => error!(error = ?e, "Persistence worker task panicked"),
        }
    }
}
