//! One-line summary of exposed-and-served ports (status bar text).

use std::sync::Arc;

use parking_lot::RwLock;

use crate::reconciler::{PortMap, Reconciler, Subscription};

/// Summary line plus hover text over the current port map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryText {
    pub text: String,
    pub tooltip: String,
}

/// Projection of the port map into a status bar summary.
pub struct StatusSummary {
    current: RwLock<SummaryText>,
}

impl Default for StatusSummary {
    fn default() -> Self {
        Self {
            current: RwLock::new(render(&[])),
        }
    }
}

impl StatusSummary {
    /// Create a summary over an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the summary from the full current mapping.
    pub fn apply(&self, ports: &PortMap) {
        let mut exposed_served: Vec<u16> = ports
            .values()
            .filter(|record| record.status.is_exposed_served())
            .map(|record| record.local_port)
            .collect();
        exposed_served.sort_unstable();
        *self.current.write() = render(&exposed_served);
    }

    /// Subscribe this summary to the reconciler's change notification.
    pub fn attach(self: &Arc<Self>, reconciler: &Reconciler) -> Subscription {
        let summary = Arc::clone(self);
        reconciler.on_change(move |ports| summary.apply(ports))
    }

    /// The current summary.
    pub fn current(&self) -> SummaryText {
        self.current.read().clone()
    }
}

fn render(exposed_served: &[u16]) -> SummaryText {
    let mut tooltip = "Click to open the ports view".to_string();
    if exposed_served.is_empty() {
        return SummaryText {
            text: "No open ports".to_string(),
            tooltip,
        };
    }

    let joined = exposed_served
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    tooltip.push_str(&format!("\n\nPorts\nPublic: {joined}"));
    SummaryText {
        text: format!("Ports: {joined}"),
        tooltip,
    }
}
