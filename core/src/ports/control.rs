//! Outbound mutation port (interface).

use crate::domain::{PortVisibility, TunnelVisibility};
use crate::error::Result;

/// Port for visibility and tunnel mutations on the remote agent/host.
///
/// All calls are fire-and-forget from the core's point of view: a success
/// carries no payload, and the resulting state change (if any) is observed
/// later through a fresh status snapshot. The core never speculatively
/// mutates its own registries on the back of these calls.
pub trait WorkspaceControl: Send + Sync {
    /// Ask the remote agent to expose a port.
    fn expose_port(&self, port: u16) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Set the visibility of an already exposed port.
    fn set_port_visibility(
        &self,
        port: u16,
        visibility: PortVisibility,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Open (or retarget) a tunnel for a port.
    fn open_tunnel(
        &self,
        port: u16,
        target_port: u16,
        visibility: TunnelVisibility,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Close the tunnel for a port.
    fn close_tunnel(&self, port: u16) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Re-run auto-exposure detection for a port.
    fn retry_auto_expose(&self, port: u16)
        -> impl std::future::Future<Output = Result<()>> + Send;
}
