//! Tunnel registry.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::domain::TunnelDescriptor;

/// The current set of locally active tunnels, keyed by the sandboxed port
/// they forward to.
///
/// The host reports the tunnel set as a complete snapshot, so the map is
/// wholesale-replaced on every change event and never patched incrementally.
/// Concurrent lookups observe either the old or the new map in full.
#[derive(Default)]
pub struct TunnelRegistry {
    tunnels: RwLock<HashMap<u16, TunnelDescriptor>>,
}

impl TunnelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically swap the entire tunnel set.
    pub fn replace(&self, tunnels: Vec<TunnelDescriptor>) {
        let map = tunnels
            .into_iter()
            .map(|t| (t.remote_port, t))
            .collect::<HashMap<_, _>>();
        *self.tunnels.write() = map;
    }

    /// The tunnel forwarding to the given sandboxed port, if any.
    pub fn lookup(&self, port: u16) -> Option<TunnelDescriptor> {
        self.tunnels.read().get(&port).cloned()
    }

    /// Number of active tunnels.
    pub fn len(&self) -> usize {
        self.tunnels.read().len()
    }

    /// Returns true if no tunnels are active.
    pub fn is_empty(&self) -> bool {
        self.tunnels.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_is_wholesale() {
        let registry = TunnelRegistry::new();
        registry.replace(vec![
            TunnelDescriptor::host(3000, "127.0.0.1", 3000),
            TunnelDescriptor::host(8080, "127.0.0.1", 9090),
        ]);
        assert_eq!(registry.len(), 2);
        assert!(registry.lookup(3000).is_some());

        registry.replace(vec![TunnelDescriptor::network(5432, "0.0.0.0", 5432)]);
        assert_eq!(registry.len(), 1);

        // Ports from the prior replace are unreachable.
        assert!(registry.lookup(3000).is_none());
        assert!(registry.lookup(8080).is_none());
        assert!(registry.lookup(5432).is_some());
    }

    #[test]
    fn test_replace_with_empty_set_clears() {
        let registry = TunnelRegistry::new();
        registry.replace(vec![TunnelDescriptor::host(3000, "127.0.0.1", 3000)]);
        registry.replace(Vec::new());
        assert!(registry.is_empty());
    }
}
