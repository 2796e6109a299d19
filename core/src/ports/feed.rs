//! Inbound status feed port (interface).

use crate::domain::PortsSnapshot;
use crate::error::Result;

/// One open subscription to the remote agent's status feed.
///
/// Yields complete snapshots in arrival order until the stream ends
/// (`None`) or fails. A caller-initiated cancellation surfaces as
/// `Err(Error::Cancelled)`, distinguished from transport failures.
pub trait StatusSubscription: Send {
    /// Await the next snapshot.
    fn next_snapshot(
        &mut self,
    ) -> impl std::future::Future<Output = Option<Result<PortsSnapshot>>> + Send;

    /// Best-effort cancellation of the in-flight subscription.
    ///
    /// After this, `next_snapshot` is expected to resolve promptly (with
    /// `Err(Error::Cancelled)` or `None`).
    fn cancel(&mut self) {}
}

/// Port for subscribing to the remote agent's port status feed.
///
/// The transport is opaque to the core: each `subscribe` opens a fresh
/// bidirectional stream of snapshots.
pub trait PortStatusFeed: Send + Sync {
    /// The subscription type this feed produces.
    type Subscription: StatusSubscription;

    /// Open a new subscription.
    fn subscribe(
        &self,
    ) -> impl std::future::Future<Output = Result<Self::Subscription>> + Send;
}
