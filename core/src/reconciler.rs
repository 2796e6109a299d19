//! Port state reconciliation engine.
//!
//! The [`Reconciler`] owns the authoritative `local port -> PortRecord`
//! mapping. It ingests complete status snapshots from the stream supervisor
//! and tunnel-set replacements from the host, merges them in a single
//! synchronous pass, and fires one change notification per pass. A
//! non-blocking re-entrancy guard coalesces concurrent triggers into the
//! pass already running.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockWriteGuard};

use crate::domain::{PortRecord, PortsSnapshot, TunnelDescriptor};
use crate::registry::TunnelRegistry;

/// The authoritative mapping from local port number to its record.
pub type PortMap = HashMap<u16, PortRecord>;

type ChangeObserver = Arc<dyn Fn(&PortMap) + Send + Sync>;
type RecordObserver = Arc<dyn Fn(&PortRecord) + Send + Sync>;

// ============================================================================
// Subscription
// ============================================================================

/// Handle to a registered observer.
///
/// Observers stay registered until `unsubscribe` is called; dropping the
/// handle alone does not detach them.
pub struct Subscription {
    unsubscribe: Box<dyn FnOnce() + Send>,
}

impl Subscription {
    /// Remove the observer from the reconciler.
    pub fn unsubscribe(self) {
        (self.unsubscribe)();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ============================================================================
// Reconciler
// ============================================================================

/// The port state reconciliation engine.
///
/// Mutation of the port map happens only inside [`reconcile`](Self::reconcile)
/// passes; external readers get cloned records or a shared reference for the
/// duration of a synchronous change callback. Records must not be cached
/// across passes - a later pass may have replaced or deleted them.
pub struct Reconciler {
    /// Authoritative port mapping. Replaced in place, entry by entry.
    ports: RwLock<PortMap>,
    /// Latest complete snapshot from the status feed, if any yet.
    latest: RwLock<Option<PortsSnapshot>>,
    /// Current tunnel set, wholesale-replaced on host events.
    tunnels: TunnelRegistry,
    /// Re-entrancy guard: set while a pass runs, concurrent triggers drop.
    updating: AtomicBool,

    change_observers: Arc<RwLock<Vec<(u64, ChangeObserver)>>>,
    accessible_observers: Arc<RwLock<Vec<(u64, RecordObserver)>>>,
    next_observer_id: AtomicU64,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    /// Create a reconciler with no snapshot and no tunnels.
    pub fn new() -> Self {
        Self {
            ports: RwLock::new(PortMap::new()),
            latest: RwLock::new(None),
            tunnels: TunnelRegistry::new(),
            updating: AtomicBool::new(false),
            change_observers: Arc::new(RwLock::new(Vec::new())),
            accessible_observers: Arc::new(RwLock::new(Vec::new())),
            next_observer_id: AtomicU64::new(0),
        }
    }

    // ========================================================================
    // Triggers
    // ========================================================================

    /// Ingest a new complete status snapshot and run a reconciliation pass.
    pub fn update_ports_status(&self, snapshot: PortsSnapshot) {
        *self.latest.write() = Some(snapshot);
        self.reconcile();
    }

    /// Replace the tunnel set and run a reconciliation pass.
    ///
    /// Before the first snapshot has arrived this replaces the registry but
    /// reconciles nothing: no empty records are fabricated for tunnels.
    pub fn update_tunnels(&self, tunnels: Vec<TunnelDescriptor>) {
        self.tunnels.replace(tunnels);
        self.reconcile();
    }

    /// One merge pass over the stored inputs.
    ///
    /// If a pass is already running the trigger is dropped: inputs are
    /// stored, not queued, so the running pass (or the next trigger) sees
    /// the freshest state anyway.
    fn reconcile(&self) {
        if self
            .updating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::trace!("reconciliation in progress, coalescing trigger");
            return;
        }
        let _done = ClearOnDrop(&self.updating);

        let snapshot = match self.latest.read().clone() {
            Some(snapshot) => snapshot,
            // Tunnel-only trigger before the first snapshot: nothing to do.
            None => return,
        };

        let mut became_accessible = Vec::new();
        {
            let mut ports = self.ports.write();
            let mut seen = HashSet::with_capacity(snapshot.ports.len());
            for status in snapshot.ports {
                let local_port = status.local_port;
                seen.insert(local_port);
                let tunnel = self.tunnels.lookup(local_port);
                match ports.entry(local_port) {
                    Entry::Occupied(mut entry) => {
                        let record = entry.get_mut();
                        // Captured before the update: the one-shot event is
                        // about a transition, not a state.
                        let was_accessible_served = record.is_accessible_served();
                        record.update(status, tunnel);
                        if !was_accessible_served && record.is_accessible_served() {
                            became_accessible.push(record.clone());
                        }
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(PortRecord::new(status, tunnel));
                    }
                }
            }
            // Snapshots are complete: anything unseen is gone.
            ports.retain(|port, _| seen.contains(port));

            let ports = RwLockWriteGuard::downgrade(ports);
            for observer in snapshot_observers(&self.change_observers) {
                observer(&ports);
            }
        }

        for record in became_accessible {
            tracing::debug!(port = record.local_port, "port became accessible while served");
            for observer in snapshot_observers(&self.accessible_observers) {
                observer(&record);
            }
        }
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Subscribe to the per-pass change notification.
    ///
    /// The callback receives the full, consistent mapping and runs
    /// synchronously inside the pass; it must not mutate the mapping, cache
    /// records beyond its own invocation, or call back into queries that
    /// take the port map lock.
    pub fn on_change(&self, f: impl Fn(&PortMap) + Send + Sync + 'static) -> Subscription {
        Self::register(&self.change_observers, &self.next_observer_id, Arc::new(f))
    }

    /// Subscribe to the one-shot "port became accessible while served"
    /// event. Fired at most once per pass per qualifying port.
    pub fn on_port_accessible(
        &self,
        f: impl Fn(&PortRecord) + Send + Sync + 'static,
    ) -> Subscription {
        Self::register(
            &self.accessible_observers,
            &self.next_observer_id,
            Arc::new(f),
        )
    }

    fn register<T: ?Sized + Send + Sync + 'static>(
        observers: &Arc<RwLock<Vec<(u64, Arc<T>)>>>,
        next_id: &AtomicU64,
        observer: Arc<T>,
    ) -> Subscription {
        let id = next_id.fetch_add(1, Ordering::Relaxed);
        observers.write().push((id, observer));
        let list = Arc::clone(observers);
        Subscription {
            unsubscribe: Box::new(move || list.write().retain(|(entry_id, _)| *entry_id != id)),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The current record for a port, if the latest snapshot knows it.
    pub fn get_port(&self, port: u16) -> Option<PortRecord> {
        self.ports.read().get(&port).cloned()
    }

    /// All current records.
    pub fn ports(&self) -> Vec<PortRecord> {
        self.ports.read().values().cloned().collect()
    }

    /// Number of ports in the current mapping.
    pub fn len(&self) -> usize {
        self.ports.read().len()
    }

    /// Returns true if no snapshot has populated the mapping yet.
    pub fn is_empty(&self) -> bool {
        self.ports.read().is_empty()
    }
}

/// Clears the `updating` flag when the pass ends, panics included.
struct ClearOnDrop<'a>(&'a AtomicBool);

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Clone the observer list out of its lock so callbacks run without holding
/// it (callbacks may subscribe or unsubscribe).
fn snapshot_observers<T: ?Sized>(observers: &RwLock<Vec<(u64, Arc<T>)>>) -> Vec<Arc<T>> {
    observers.read().iter().map(|(_, f)| Arc::clone(f)).collect()
}
