//! Tree-structured port view.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::IconStatus;
use crate::reconciler::{PortMap, Reconciler, Subscription};

/// One row of the ports tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortTreeItem {
    pub local_port: u16,
    pub label: String,
    pub tooltip: String,
    pub description: String,
    pub icon_status: IconStatus,
    pub context_value: String,
}

/// Projection of the port map into an ordered list of tree rows.
///
/// Owns no port state: every notification rebuilds the rows in full from
/// the mapping it is handed.
#[derive(Default)]
pub struct PortTreeModel {
    items: RwLock<BTreeMap<u16, PortTreeItem>>,
}

impl PortTreeModel {
    /// Create an empty tree model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the rows from the full current mapping.
    pub fn apply(&self, ports: &PortMap) {
        let items = ports
            .values()
            .map(|record| {
                (
                    record.local_port,
                    PortTreeItem {
                        local_port: record.local_port,
                        label: record.info.label.clone(),
                        tooltip: record.info.tooltip.clone(),
                        description: record.info.description.clone(),
                        icon_status: record.info.icon_status,
                        context_value: record.info.context_value.clone(),
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();
        *self.items.write() = items;
    }

    /// Subscribe this model to the reconciler's change notification.
    pub fn attach(self: &Arc<Self>, reconciler: &Reconciler) -> Subscription {
        let model = Arc::clone(self);
        reconciler.on_change(move |ports| model.apply(ports))
    }

    /// Current rows, ordered by port number.
    pub fn items(&self) -> Vec<PortTreeItem> {
        self.items.read().values().cloned().collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns true if the tree has no rows.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PortRecord, PortStatus};

    fn map_of(ports: &[u16]) -> PortMap {
        ports
            .iter()
            .map(|&port| {
                let status = PortStatus {
                    served: true,
                    ..PortStatus::new(port)
                };
                (port, PortRecord::new(status, None))
            })
            .collect()
    }

    #[test]
    fn test_rows_ordered_by_port() {
        let model = PortTreeModel::new();
        model.apply(&map_of(&[8080, 80, 3000]));

        let ports: Vec<u16> = model.items().iter().map(|i| i.local_port).collect();
        assert_eq!(ports, vec![80, 3000, 8080]);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let model = PortTreeModel::new();
        let map = map_of(&[80, 3000]);

        model.apply(&map);
        let first = model.items();
        model.apply(&map);
        assert_eq!(model.items(), first);
    }

    #[test]
    fn test_stale_rows_dropped() {
        let model = PortTreeModel::new();
        model.apply(&map_of(&[80, 3000]));
        assert_eq!(model.len(), 2);

        model.apply(&map_of(&[3000]));
        let items = model.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].local_port, 3000);
    }
}
