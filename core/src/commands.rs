//! Command dispatch to the remote agent.
//!
//! Translates user intent (visibility toggles, tunnel open/close, retrying
//! auto-exposure) into mutation calls on the [`WorkspaceControl`] port.
//! Every call carries a fixed deadline. A failed or timed-out call surfaces
//! to the caller as a rejected operation and mutates nothing locally - the
//! resulting state change, if any, arrives through the next status snapshot.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::CommandConfig;
use crate::domain::{PortVisibility, TunnelVisibility};
use crate::error::{Error, Result};
use crate::ports::WorkspaceControl;
use crate::reconciler::Reconciler;

/// Dispatches port commands to the remote agent with a per-call deadline.
pub struct CommandDispatcher<C: WorkspaceControl> {
    control: Arc<C>,
    reconciler: Arc<Reconciler>,
    config: CommandConfig,
}

impl<C: WorkspaceControl> CommandDispatcher<C> {
    /// Create a dispatcher over the given control surface.
    pub fn new(control: Arc<C>, reconciler: Arc<Reconciler>, config: CommandConfig) -> Self {
        Self {
            control,
            reconciler,
            config,
        }
    }

    /// Make an exposed port reachable by anyone with the URL.
    pub async fn make_public(&self, port: u16) -> Result<()> {
        self.with_deadline(
            self.control
                .set_port_visibility(port, PortVisibility::Public),
        )
        .await
    }

    /// Restrict an exposed port to authenticated workspace users.
    pub async fn make_private(&self, port: u16) -> Result<()> {
        self.with_deadline(
            self.control
                .set_port_visibility(port, PortVisibility::Private),
        )
        .await
    }

    /// Open a tunnel for a port. `target_port` defaults to the port itself.
    pub async fn open_tunnel(
        &self,
        port: u16,
        target_port: Option<u16>,
        visibility: TunnelVisibility,
    ) -> Result<()> {
        self.with_deadline(
            self.control
                .open_tunnel(port, target_port.unwrap_or(port), visibility),
        )
        .await
    }

    /// Close the tunnel for a port.
    pub async fn close_tunnel(&self, port: u16) -> Result<()> {
        self.with_deadline(self.control.close_tunnel(port)).await
    }

    /// Re-run auto-exposure detection for a port.
    pub async fn retry_auto_expose(&self, port: u16) -> Result<()> {
        self.with_deadline(self.control.retry_auto_expose(port))
            .await
    }

    /// Resolve the externally reachable URL of a port's exposure.
    ///
    /// Returns immediately when the port is already exposed. Otherwise asks
    /// the remote agent to expose it and waits for a reconciliation pass to
    /// report the exposure. Only the expose call itself is bounded by the
    /// deadline; the wait ends when the exposure shows up.
    pub async fn resolve_external_port(&self, port: u16) -> Result<String> {
        if let Some(url) = self.exposed_url(port) {
            return Ok(url);
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = self.reconciler.on_change(move |ports| {
            if let Some(record) = ports.get(&port) {
                if let Some(exposed) = &record.status.exposed {
                    // Receiver may already be gone; nothing to do then.
                    let _ = tx.send(exposed.url.clone());
                }
            }
        });

        // The exposure may have landed between the first check and the
        // subscription; check again so we never wait on a stale condition.
        if let Some(url) = self.exposed_url(port) {
            subscription.unsubscribe();
            return Ok(url);
        }

        if let Err(e) = self.with_deadline(self.control.expose_port(port)).await {
            subscription.unsubscribe();
            return Err(e);
        }

        let url = rx.recv().await;
        subscription.unsubscribe();
        url.ok_or_else(|| Error::Unresolvable(format!("port {port} exposure not observed")))
    }

    fn exposed_url(&self, port: u16) -> Option<String> {
        self.reconciler
            .get_port(port)
            .and_then(|record| record.status.exposed.map(|e| e.url))
    }

    async fn with_deadline<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.config.deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::DeadlineExceeded(self.config.deadline)),
        }
    }
}
