//! Background loading of file sources.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::LoaderError;
use crate::resource::{InFlight, Shared};
use crate::source::Stage;
use crate::state::ResourceState;

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Reads every stage in order, all or nothing
pub(crate) fn read_stages_blocking(
    paths: &[Stage<PathBuf>],
) -> Result<Vec<Stage<Bytes>>, LoaderError> {
    paths
        .iter()
        .map(|stage| {
            std::fs::read(&stage.data)
                .map(|data| Stage::new(stage.kind, Bytes::from(data)))
                .map_err(|source| LoaderError::Io {
                    path: stage.data.clone(),
                    source,
                })
        })
        .collect()
}

async fn read_stages(paths: &[Stage<PathBuf>]) -> Result<Vec<Stage<Bytes>>, LoaderError> {
    let mut content = Vec::with_capacity(paths.len());
    for stage in paths {
        let data = tokio::fs::read(&stage.data)
            .await
            .map_err(|source| LoaderError::Io {
                path: stage.data.clone(),
                source,
            })?;
        content.push(Stage::new(stage.kind, Bytes::from(data)));
    }
    Ok(content)
}

/// Clears the in-flight marker when the worker exits, however it exits
struct InFlightGuard {
    shared: Arc<Mutex<Shared>>,
    ticket: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut shared = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        if shared
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.ticket == self.ticket)
        {
            shared.in_flight = None;
        }
    }
}

async fn run(
    guard: InFlightGuard,
    token: CancellationToken,
    paths: Vec<Stage<PathBuf>>,
) -> Result<(), LoaderError> {
    let read = tokio::select! {
        biased;
        _ = token.cancelled() => None,
        read = read_stages(&paths) => Some(read),
    };
    let Some(read) = read else {
        debug!(ticket = guard.ticket, "Load cancelled");
        return Ok(());
    };
    let content = read?;

    let mut shared = guard.shared.lock()?;
    // Cancellation and commit are both decided under the lock
    if token.is_cancelled() || shared.state != ResourceState::FoundPath {
        debug!(ticket = guard.ticket, "Load cancelled, discarding content");
        return Ok(());
    }
    shared.content = content;
    shared.state = ResourceState::Content;
    shared.in_flight = None;
    debug!(ticket = guard.ticket, "Load committed");
    Ok(())
}

/// Marks `shared` busy and starts reading `paths` on `runtime`
///
/// The caller must hold the lock over `shared` so the marker is in place before the worker can
/// observe it.
pub(crate) fn spawn_load(
    runtime: &tokio::runtime::Handle,
    handle: &Arc<Mutex<Shared>>,
    shared: &mut Shared,
    paths: Vec<Stage<PathBuf>>,
) -> LoadHandle {
    let ticket = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
    let token = CancellationToken::new();
    shared.in_flight = Some(InFlight {
        ticket,
        token: token.clone(),
    });
    trace!(ticket, stages = paths.len(), "Spawning load");

    let guard = InFlightGuard {
        shared: handle.clone(),
        ticket,
    };
    let task = runtime.spawn(run(guard, token.clone(), paths));
    LoadHandle {
        task: Some(task),
        token,
        shared: handle.clone(),
        ticket,
    }
}

/// A cancelled worker that still failed reports its failure
fn cancel_outcome(cancelled: bool, result: Result<(), LoaderError>) -> Result<bool, LoaderError> {
    result.map(|()| cancelled)
}

/// Tracks an asynchronous load started by [`crate::Resource::load_async`]
///
/// Dropping the handle without joining it cancels the load.
#[derive(Debug)]
#[must_use = "dropping a LoadHandle cancels the load"]
pub struct LoadHandle {
    task: Option<JoinHandle<Result<(), LoaderError>>>,
    token: CancellationToken,
    shared: Arc<Mutex<Shared>>,
    ticket: u64,
}

impl LoadHandle {
    async fn wait(&mut self) -> Result<(), LoaderError> {
        match self.task.take() {
            Some(task) => task
                .await
                .map_err(|err| LoaderError::Worker(err.to_string()))?,
            None => Ok(()),
        }
    }

    /// Wait for the load to finish and return its outcome
    pub async fn join(mut self) -> Result<(), LoaderError> {
        self.wait().await
    }

    /// Cancel the load if it has not committed yet, then wait for the worker
    ///
    /// Returns whether the cancellation took effect. When it did, the resource stays in
    /// [`ResourceState::FoundPath`] with no content. A failure the worker hit before noticing the
    /// cancellation is still returned.
    pub async fn cancel(mut self) -> Result<bool, LoaderError> {
        let cancelled = {
            let shared = self.shared.lock()?;
            let pending = shared
                .in_flight
                .as_ref()
                .is_some_and(|in_flight| in_flight.ticket == self.ticket);
            if pending {
                self.token.cancel();
            }
            pending
        };
        cancel_outcome(cancelled, self.wait().await)
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.token.cancel();
        }
    }
}

/// Result of [`crate::Resource::load`]
#[derive(Debug)]
#[must_use]
pub enum Loading {
    /// Content is already in place
    Complete,
    Pending(LoadHandle),
}

impl Loading {
    pub async fn wait(self) -> Result<(), LoaderError> {
        match self {
            Loading::Complete => Ok(()),
            Loading::Pending(handle) => handle.join().await,
        }
    }
}
