//! Domain layer - Pure data models and the presentation derivation.
//!
//! These types have no I/O dependencies and can be tested in isolation.

mod record;
mod status;
mod tunnel;

// Re-export all domain types
pub use record::{IconStatus, PortPresentation, PortRecord};
pub use status::{
    AutoExposure, ExposedInfo, OnExposedAction, PortStatus, PortVisibility, PortsSnapshot,
};
pub use tunnel::{TunnelAddress, TunnelDescriptor, TunnelVisibility};
