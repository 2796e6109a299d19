//! View synchronizers.
//!
//! Independent consumers of the reconciler's change notification. Each one
//! projects the full current mapping into its own presentation structure -
//! never incrementally - so re-applying the same mapping always yields the
//! same output, and deleted ports never linger.

mod panel;
mod summary;
mod tree;

pub use panel::{PortPanelModel, PortViewEntry, PortViewStatus};
pub use summary::{StatusSummary, SummaryText};
pub use tree::{PortTreeItem, PortTreeModel};
