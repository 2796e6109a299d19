//! Raw port-status feed models.
//!
//! These mirror the per-port records the remote agent streams: each snapshot
//! is the complete list of known ports, never a delta.

use serde::{Deserialize, Serialize};

// ============================================================================
// PortVisibility
// ============================================================================

/// Visibility level of an exposed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PortVisibility {
    /// Reachable by anyone who knows the URL.
    Public,
    /// Reachable only by authenticated workspace users.
    #[default]
    Private,
}

// ============================================================================
// OnExposedAction
// ============================================================================

/// What the client should do when a port gets exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum OnExposedAction {
    /// Take no action.
    #[default]
    Ignore,
    /// Open the external URL in a browser.
    OpenBrowser,
    /// Open the external URL in an embedded preview.
    OpenPreview,
    /// Show a "service is available" notification.
    Notify,
    /// Notify, offering to make the port public if it is private.
    NotifyPrivate,
}

// ============================================================================
// AutoExposure
// ============================================================================

/// State of the automatic exposure detection for a served port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AutoExposure {
    /// No auto-exposure attempt is relevant for this port.
    #[default]
    None,
    /// Auto-exposure detection is still running.
    Pending,
    /// Auto-exposure detection gave up on this port.
    Failed,
}

// ============================================================================
// ExposedInfo
// ============================================================================

/// Exposure details for a port the remote agent has published.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposedInfo {
    /// Externally reachable URL for this port.
    pub url: String,
    /// Who can reach the URL.
    pub visibility: PortVisibility,
    /// Client-side action to take once exposed.
    #[serde(default)]
    pub on_exposed: OnExposedAction,
}

impl ExposedInfo {
    /// Exposure with the given URL and visibility, no client action.
    pub fn new(url: impl Into<String>, visibility: PortVisibility) -> Self {
        Self {
            url: url.into(),
            visibility,
            on_exposed: OnExposedAction::Ignore,
        }
    }

    /// Returns true if the exposure is public.
    pub fn is_public(&self) -> bool {
        self.visibility == PortVisibility::Public
    }
}

// ============================================================================
// PortStatus
// ============================================================================

/// The raw status of a single port, as reported by the status feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortStatus {
    /// The in-sandbox port number. Identity key within a snapshot.
    pub local_port: u16,

    /// Configured name for the port, if any.
    #[serde(default)]
    pub name: Option<String>,

    /// Configured description for the port, if any.
    #[serde(default)]
    pub description: Option<String>,

    /// Whether a process is actively listening on the port.
    pub served: bool,

    /// Exposure details, present once the remote agent has published the port.
    #[serde(default)]
    pub exposed: Option<ExposedInfo>,

    /// State of automatic exposure detection.
    #[serde(default)]
    pub auto_exposure: AutoExposure,
}

impl PortStatus {
    /// A bare status for a port that is not served and not exposed.
    pub fn new(local_port: u16) -> Self {
        Self {
            local_port,
            name: None,
            description: None,
            served: false,
            exposed: None,
            auto_exposure: AutoExposure::None,
        }
    }

    /// Returns true if the port is both exposed and served.
    pub fn is_exposed_served(&self) -> bool {
        self.served && self.exposed.is_some()
    }
}

// ============================================================================
// PortsSnapshot
// ============================================================================

/// One complete status snapshot from the remote agent.
///
/// Ports absent from a snapshot no longer exist; consumers must delete
/// their state for them rather than carry it forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortsSnapshot {
    /// All currently known ports.
    pub ports: Vec<PortStatus>,
}

impl PortsSnapshot {
    /// Snapshot over the given port statuses.
    pub fn new(ports: Vec<PortStatus>) -> Self {
        Self { ports }
    }
}
