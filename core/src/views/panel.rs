//! Serializable view-model for the embedded ports panel.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::domain::{PortPresentation, PortStatus, TunnelDescriptor};
use crate::error::Result;
use crate::reconciler::{PortMap, Reconciler, Subscription};

/// Raw status as shipped to the panel: the feed fields plus the resolved
/// remote-side port of any tunnel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortViewStatus {
    #[serde(flatten)]
    pub status: PortStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tunnel: Option<TunnelDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_port: Option<u16>,
}

/// One panel entry: derived presentation plus the raw status behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortViewEntry {
    pub info: PortPresentation,
    pub status: PortViewStatus,
}

/// Projection of the port map into a serializable view-model array.
#[derive(Default)]
pub struct PortPanelModel {
    entries: RwLock<Vec<PortViewEntry>>,
}

impl PortPanelModel {
    /// Create an empty panel model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the view-model array from the full current mapping.
    pub fn apply(&self, ports: &PortMap) {
        let mut entries = ports
            .values()
            .map(|record| PortViewEntry {
                info: record.info.clone(),
                status: PortViewStatus {
                    status: record.status.clone(),
                    tunnel: record.tunnel.clone(),
                    remote_port: record.remote_port(),
                },
            })
            .collect::<Vec<_>>();
        entries.sort_by_key(|entry| entry.status.status.local_port);
        *self.entries.write() = entries;
    }

    /// Subscribe this model to the reconciler's change notification.
    pub fn attach(self: &Arc<Self>, reconciler: &Reconciler) -> Subscription {
        let model = Arc::clone(self);
        reconciler.on_change(move |ports| model.apply(ports))
    }

    /// Current entries, ordered by port number.
    pub fn entries(&self) -> Vec<PortViewEntry> {
        self.entries.read().clone()
    }

    /// The entries serialized for the panel.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&*self.entries.read())?)
    }
}
