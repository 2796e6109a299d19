//! Status stream supervision with auto-resubscribe.
//!
//! Owns a long-lived subscription to the remote agent's port status feed.
//! On any stream termination it waits a fixed interval and resubscribes,
//! forever; a transport failure therefore degrades to a stale port list,
//! never to an error. The loop runs until the returned handle is disposed.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::SupervisorConfig;
use crate::domain::PortsSnapshot;
use crate::ports::{PortStatusFeed, StatusSubscription};

// ============================================================================
// StatusStreamHandle
// ============================================================================

/// Handle to a running status stream observation. The Disposable.
///
/// Disposal cancels the in-flight subscription (best effort) and stops the
/// resubscribe loop, even when it races with a backoff sleep.
pub struct StatusStreamHandle {
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl StatusStreamHandle {
    /// Stop observing. Idempotent; never reported as an error.
    pub fn dispose(&self) {
        self.cancel.cancel();
    }

    /// Returns true once the observation loop has fully stopped.
    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }

    /// Dispose and wait for the loop to wind down.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        // The loop only ends via cancellation, so join errors would mean a
        // panic inside an observer callback; surface nothing here.
        let _ = self.task.await;
    }
}

// ============================================================================
// StatusStreamSupervisor
// ============================================================================

/// Self-healing subscription to the port status feed.
pub struct StatusStreamSupervisor<F: PortStatusFeed> {
    feed: Arc<F>,
    config: SupervisorConfig,
}

impl<F: PortStatusFeed + 'static> StatusStreamSupervisor<F> {
    /// Create a supervisor over the given feed.
    pub fn new(feed: Arc<F>, config: SupervisorConfig) -> Self {
        Self { feed, config }
    }

    /// Start observing; every received snapshot is handed to `on_snapshot`
    /// synchronously, in receipt order. Only the latest snapshot matters,
    /// so nothing is buffered or replayed.
    pub fn observe(
        &self,
        on_snapshot: impl Fn(PortsSnapshot) + Send + Sync + 'static,
    ) -> StatusStreamHandle {
        let cancel = CancellationToken::new();
        let feed = Arc::clone(&self.feed);
        let config = self.config.clone();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            observe_loop(feed, config, on_snapshot, task_cancel).await;
        });
        StatusStreamHandle { cancel, task }
    }
}

/// Main loop: subscribe -> stream -> fixed backoff -> resubscribe.
///
/// Written as a loop with a cooperative delay rather than recursion, so the
/// stack stays bounded under indefinite retry. Cancellation is checked
/// (biased) before every await, including mid-backoff.
async fn observe_loop<F: PortStatusFeed>(
    feed: Arc<F>,
    config: SupervisorConfig,
    on_snapshot: impl Fn(PortsSnapshot) + Send + Sync,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = feed.subscribe() => {
                match result {
                    Ok(subscription) => {
                        stream_snapshots(subscription, &on_snapshot, &cancel).await;
                    }
                    Err(e) if e.is_cancelled() => {
                        tracing::debug!("status feed subscription cancelled");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "cannot subscribe to port status feed");
                    }
                }
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(config.retry_delay) => {}
        }
    }

    tracing::debug!("status stream observation stopped");
}

/// Drain one subscription until it ends, errors, or the caller cancels.
async fn stream_snapshots<S: StatusSubscription>(
    mut subscription: S,
    on_snapshot: &(impl Fn(PortsSnapshot) + Send + Sync),
    cancel: &CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                subscription.cancel();
                return;
            }
            next = subscription.next_snapshot() => {
                match next {
                    Some(Ok(snapshot)) => on_snapshot(snapshot),
                    Some(Err(e)) if e.is_cancelled() => {
                        // Expected termination, not a fault.
                        tracing::debug!("status stream cancelled");
                        return;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "cannot maintain connection to status feed");
                        return;
                    }
                    None => {
                        tracing::debug!("status stream ended");
                        return;
                    }
                }
            }
        }
    }
}
