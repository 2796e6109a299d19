//! PortSync Core Library
//!
//! Keeps a development sandbox's port visibility state consistent across
//! three asynchronously-updated sources:
//! - a streaming port status feed from the remote agent,
//! - the host's set of active port tunnels,
//! - user-issued visibility commands.
//!
//! The reconciliation engine merges raw, partial, out-of-order updates into
//! one authoritative per-port record, derives presentation state for each
//! port, and republishes change notifications to downstream views exactly
//! once per logical change.
//!
//! # Architecture
//! - `domain`: pure data models and the presentation derivation
//! - `ports`: trait definitions for the external collaborators (status
//!   feed, mutation surface); implementations are injected
//! - `reconciler`: the authoritative port map and its merge pass
//! - `supervisor`: self-healing subscription to the status feed
//! - `views`: idempotent projections for tree, panel, and summary consumers
//! - `commands`: mutation dispatch with per-call deadlines
//!
//! Nothing is persisted: port state is re-derived from the live feed after
//! every restart.

pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod reconciler;
pub mod registry;
pub mod supervisor;
pub mod views;

// Re-export domain types (primary API)
pub use domain::{
    AutoExposure, ExposedInfo, IconStatus, OnExposedAction, PortPresentation, PortRecord,
    PortStatus, PortVisibility, PortsSnapshot, TunnelAddress, TunnelDescriptor, TunnelVisibility,
};

// Re-export other commonly used types
pub use commands::CommandDispatcher;
pub use config::{CommandConfig, SupervisorConfig};
pub use error::{Error, Result};
pub use reconciler::{PortMap, Reconciler, Subscription};
pub use registry::TunnelRegistry;
pub use supervisor::{StatusStreamHandle, StatusStreamSupervisor};
