use std::pin::pin;

use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

mod position;
pub use position::*;

use crate::monitor::{AlertDispatcher, ContainmentState, GeofenceMonitor};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SessionStatus {
    Tracking,
    PermissionDenied,
    SourceError(String),
    Stopped,
}

impl From<PositionError> for SessionStatus {
    fn from(value: PositionError) -> Self {
        match value {
            PositionError::PermissionDenied => Self::PermissionDenied,
            PositionError::Unavailable(reason) => Self::SourceError(reason),
        }
    }
}

/// Drives a [`GeofenceMonitor`] from a stream of position samples.
///
/// Samples are evaluated one at a time in delivery order. The monitor lives
/// inside the session task, so nothing else can touch its state.
pub struct NavigationSession {
    monitor: GeofenceMonitor,
    dispatcher: AlertDispatcher,
}

impl NavigationSession {
    pub fn new(monitor: GeofenceMonitor, dispatcher: AlertDispatcher) -> Self {
        Self {
            monitor,
            dispatcher,
        }
    }

    /// Starts consuming `positions` on the tokio runtime.
    pub fn spawn<S>(self, positions: S) -> SessionHandle
    where
        S: Stream<Item = Result<PositionSample, PositionError>> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(self.monitor.snapshot());
        let (status_tx, status_rx) = watch::channel(SessionStatus::Tracking);
        let task = tokio::spawn(run(
            self.monitor,
            self.dispatcher,
            positions,
            cancel.clone(),
            snapshot_tx,
            status_tx,
        ));
        SessionHandle {
            _guard: cancel.clone().drop_guard(),
            cancel,
            snapshot: snapshot_rx,
            status: status_rx,
            task,
        }
    }
}

async fn run<S>(
    mut monitor: GeofenceMonitor,
    dispatcher: AlertDispatcher,
    positions: S,
    cancel: CancellationToken,
    snapshot_tx: watch::Sender<ContainmentState>,
    status_tx: watch::Sender<SessionStatus>,
) -> GeofenceMonitor
where
    S: Stream<Item = Result<PositionSample, PositionError>>,
{
    let mut positions = pin!(positions);
    info!(
        "Navigation session started with {} zones",
        monitor.registry().len()
    );
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = positions.next() => next,
        };
        match next {
            Some(Ok(sample)) => {
                if cancel.is_cancelled() {
                    break;
                }
                status_tx.send_if_modified(|status| {
                    let changed = *status != SessionStatus::Tracking;
                    *status = SessionStatus::Tracking;
                    changed
                });
                match monitor.process(&sample) {
                    Ok(events) => {
                        dispatcher.dispatch(&events);
                        let snapshot = monitor.snapshot();
                        snapshot_tx.send_if_modified(|current| {
                            if *current == snapshot {
                                false
                            } else {
                                *current = snapshot;
                                true
                            }
                        });
                    }
                    Err(err) => warn!("Dropping sample: {err}"),
                }
            }
            Some(Err(err)) => {
                warn!("Position source reported: {err}");
                status_tx.send_replace(err.into());
            }
            None => {
                debug!("Position source ended");
                break;
            }
        }
    }
    monitor.stop();
    status_tx.send_replace(SessionStatus::Stopped);
    info!("Navigation session stopped");
    monitor
}

/// Owner side of a running session. Dropping it cancels the session.
pub struct SessionHandle {
    _guard: DropGuard,
    cancel: CancellationToken,
    snapshot: watch::Receiver<ContainmentState>,
    status: watch::Receiver<SessionStatus>,
    task: JoinHandle<GeofenceMonitor>,
}

impl SessionHandle {
    /// Containment after the most recently processed sample.
    pub fn snapshot(&self) -> ContainmentState {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ContainmentState> {
        self.snapshot.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the session and waits for the loop to exit. Samples still
    /// queued in the source are never evaluated.
    pub async fn stop(self) -> Result<GeofenceMonitor, self::Error> {
        self.cancel.cancel();
        let monitor = self.task.await?;
        Ok(monitor)
    }
}
