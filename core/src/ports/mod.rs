//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the seams to the external collaborators: the inbound
//! status feed and the outbound mutation surface of the remote agent.
//! Implementations (gRPC, test doubles, ...) are injected by the caller.

mod control;
mod feed;

pub use control::WorkspaceControl;
pub use feed::{PortStatusFeed, StatusSubscription};
