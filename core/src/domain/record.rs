//! Per-port record and presentation derivation.
//!
//! A [`PortRecord`] combines the raw feed status and the current tunnel for
//! one port, plus presentation info derived from the two. The derivation is
//! a pure function and is recomputed in full on every mutation - derived
//! fields are never patched incrementally.

use serde::{Deserialize, Serialize};

use super::status::{AutoExposure, PortStatus};
use super::tunnel::TunnelDescriptor;

// ============================================================================
// IconStatus
// ============================================================================

/// Presentation state of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconStatus {
    /// Served and accessible (exposed or tunneled).
    Served,
    /// No process is listening on the port.
    NotServed,
    /// Served, not yet accessible, auto-exposure still in progress.
    Detecting,
    /// Served, not accessible, and auto-exposure gave up.
    ExposureFailed,
}

// ============================================================================
// PortPresentation
// ============================================================================

/// Derived, presentation-ready info for a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortPresentation {
    /// Short list label, e.g. `"api: 3000"` or `"3000:4000"`.
    pub label: String,
    /// Hover text, e.g. `"api - serves the backend"`.
    pub tooltip: String,
    /// One-line state description, e.g. `"open on localhost (private)"`.
    pub description: String,
    /// Coarse presentation state.
    pub icon_status: IconStatus,
    /// Compositional context tag, e.g. `"network-private-exposed-served-port"`.
    ///
    /// Built by prefixing the base tag `port`; the prefix order is fixed and
    /// consumers match on the composed value.
    pub context_value: String,
    /// Synthesized localhost URL for the port.
    pub local_url: String,
    /// Best externally reachable URL: tunnel address over exposure URL over
    /// the localhost fallback.
    pub external_url: String,
}

impl PortPresentation {
    /// Derive the full presentation for `(status, tunnel)`.
    ///
    /// Pure and infallible: malformed tunnel addresses degrade to an absent
    /// remote port instead of failing.
    pub fn derive(status: &PortStatus, tunnel: Option<&TunnelDescriptor>) -> Self {
        let local_port = status.local_port;
        let local_url = format!("http://localhost:{local_port}");

        let mut label = match &status.name {
            Some(name) => format!("{name}: {local_port}"),
            None => local_port.to_string(),
        };
        let remote_port = tunnel.and_then(|t| t.local_port());
        if let Some(remote) = remote_port {
            if remote != local_port {
                label.push_str(&format!(":{remote}"));
            }
        }

        let tooltip = match (&status.name, &status.description) {
            (Some(name), Some(description)) => format!("{name} - {description}"),
            (_, Some(description)) => description.clone(),
            _ => String::new(),
        };

        let accessible = status.exposed.is_some() || tunnel.is_some();
        let tunnel_public = tunnel.is_some_and(|t| t.public);

        let (description, icon_status) = if !status.served {
            ("not served".to_string(), IconStatus::NotServed)
        } else if !accessible {
            if status.auto_exposure == AutoExposure::Failed {
                ("failed to expose".to_string(), IconStatus::ExposureFailed)
            } else {
                ("detecting...".to_string(), IconStatus::Detecting)
            }
        } else {
            let mut text = "open".to_string();
            if tunnel.is_some() {
                text.push_str(if tunnel_public {
                    " on all interfaces"
                } else {
                    " on localhost"
                });
            }
            if let Some(exposed) = &status.exposed {
                text.push_str(if exposed.is_public() {
                    " (public)"
                } else {
                    " (private)"
                });
            }
            (text, IconStatus::Served)
        };

        let mut context_value = "port".to_string();
        if status.served {
            context_value = format!("served-{context_value}");
        }
        if let Some(exposed) = &status.exposed {
            context_value = format!("exposed-{context_value}");
            let visibility = if exposed.is_public() { "public" } else { "private" };
            context_value = format!("{visibility}-{context_value}");
        }
        if tunnel.is_some() {
            let reach = if tunnel_public { "network" } else { "host" };
            context_value = format!("{reach}-{context_value}");
        }
        if !accessible && status.auto_exposure == AutoExposure::Failed {
            context_value = format!("failed-{context_value}");
        }

        let external_url = match tunnel {
            Some(t) => t.local_address.to_http_url(),
            None => status
                .exposed
                .as_ref()
                .filter(|e| !e.url.is_empty())
                .map(|e| e.url.clone())
                .unwrap_or_else(|| local_url.clone()),
        };

        Self {
            label,
            tooltip,
            description,
            icon_status,
            context_value,
            local_url,
            external_url,
        }
    }
}

// ============================================================================
// PortRecord
// ============================================================================

/// The authoritative per-port entity: raw status, current tunnel, and the
/// presentation derived from the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRecord {
    /// The in-sandbox port number. Identity key within the port map.
    pub local_port: u16,
    /// Last raw status received for this port.
    pub status: PortStatus,
    /// Active tunnel for this port, if any.
    pub tunnel: Option<TunnelDescriptor>,
    /// Derived presentation info. Never set directly.
    pub info: PortPresentation,
}

impl PortRecord {
    /// Create a record from the first status seen for a port.
    pub fn new(status: PortStatus, tunnel: Option<TunnelDescriptor>) -> Self {
        let info = PortPresentation::derive(&status, tunnel.as_ref());
        Self {
            local_port: status.local_port,
            status,
            tunnel,
            info,
        }
    }

    /// Replace the raw status and tunnel wholesale and recompute the
    /// presentation. Infallible.
    pub fn update(&mut self, status: PortStatus, tunnel: Option<TunnelDescriptor>) {
        self.info = PortPresentation::derive(&status, tunnel.as_ref());
        self.local_port = status.local_port;
        self.status = status;
        self.tunnel = tunnel;
    }

    /// The local-side port of the tunnel, when one exists and parses.
    pub fn remote_port(&self) -> Option<u16> {
        self.tunnel.as_ref().and_then(|t| t.local_port())
    }

    /// Returns true if the port is reachable at all: exposed or tunneled.
    pub fn is_accessible(&self) -> bool {
        self.status.exposed.is_some() || self.tunnel.is_some()
    }

    /// Returns true if the port is served and reachable - the condition the
    /// one-shot "became accessible" event is keyed on.
    pub fn is_accessible_served(&self) -> bool {
        self.status.served && self.is_accessible()
    }

    /// Best externally reachable URL for this port.
    pub fn external_url(&self) -> &str {
        &self.info.external_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::{ExposedInfo, PortVisibility};

    fn served(local_port: u16) -> PortStatus {
        PortStatus {
            served: true,
            ..PortStatus::new(local_port)
        }
    }

    fn exposed(visibility: PortVisibility) -> Option<ExposedInfo> {
        Some(ExposedInfo::new("https://3000-ws.example.dev", visibility))
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let status = PortStatus {
            exposed: exposed(PortVisibility::Public),
            ..served(3000)
        };
        let tunnel = TunnelDescriptor::host(3000, "127.0.0.1", 4000);

        let first = PortPresentation::derive(&status, Some(&tunnel));
        let second = PortPresentation::derive(&status, Some(&tunnel));
        assert_eq!(first, second);
    }

    #[test]
    fn test_not_served_wins_regardless_of_exposure() {
        let status = PortStatus {
            served: false,
            exposed: exposed(PortVisibility::Public),
            auto_exposure: AutoExposure::Failed,
            ..PortStatus::new(3000)
        };
        let tunnel = TunnelDescriptor::host(3000, "127.0.0.1", 3000);

        let info = PortPresentation::derive(&status, Some(&tunnel));
        assert_eq!(info.icon_status, IconStatus::NotServed);
        assert_eq!(info.description, "not served");
    }

    #[test]
    fn test_exposure_failed_requires_inaccessible() {
        let status = PortStatus {
            auto_exposure: AutoExposure::Failed,
            ..served(3000)
        };

        let info = PortPresentation::derive(&status, None);
        assert_eq!(info.icon_status, IconStatus::ExposureFailed);
        assert_eq!(info.description, "failed to expose");
        assert_eq!(info.context_value, "failed-served-port");

        // A tunnel makes the port accessible; the failure no longer shows.
        let tunnel = TunnelDescriptor::host(3000, "127.0.0.1", 3000);
        let info = PortPresentation::derive(&status, Some(&tunnel));
        assert_eq!(info.icon_status, IconStatus::Served);
        assert_eq!(info.context_value, "host-served-port");
    }

    #[test]
    fn test_detecting_while_auto_exposure_pending() {
        for auto_exposure in [AutoExposure::None, AutoExposure::Pending] {
            let status = PortStatus {
                auto_exposure,
                ..served(3000)
            };
            let info = PortPresentation::derive(&status, None);
            assert_eq!(info.icon_status, IconStatus::Detecting);
            assert_eq!(info.description, "detecting...");
            assert_eq!(info.context_value, "served-port");
        }
    }

    #[test]
    fn test_state_table_served_combinations() {
        // exposed private, no tunnel
        let status = PortStatus {
            exposed: exposed(PortVisibility::Private),
            ..served(3000)
        };
        let info = PortPresentation::derive(&status, None);
        assert_eq!(info.icon_status, IconStatus::Served);
        assert_eq!(info.description, "open (private)");
        assert_eq!(info.context_value, "private-exposed-served-port");

        // exposed public, network tunnel
        let status = PortStatus {
            exposed: exposed(PortVisibility::Public),
            ..served(3000)
        };
        let tunnel = TunnelDescriptor::network(3000, "0.0.0.0", 3000);
        let info = PortPresentation::derive(&status, Some(&tunnel));
        assert_eq!(info.icon_status, IconStatus::Served);
        assert_eq!(info.description, "open on all interfaces (public)");
        assert_eq!(info.context_value, "network-public-exposed-served-port");

        // host tunnel only
        let info = PortPresentation::derive(
            &served(3000),
            Some(&TunnelDescriptor::host(3000, "127.0.0.1", 3000)),
        );
        assert_eq!(info.icon_status, IconStatus::Served);
        assert_eq!(info.description, "open on localhost");
        assert_eq!(info.context_value, "host-served-port");
    }

    #[test]
    fn test_label_formatting() {
        let info = PortPresentation::derive(&served(3000), None);
        assert_eq!(info.label, "3000");

        let status = PortStatus {
            name: Some("web".to_string()),
            ..served(3000)
        };
        let info = PortPresentation::derive(&status, None);
        assert_eq!(info.label, "web: 3000");

        // A tunnel remapping to a different local-side port shows up.
        let tunnel = TunnelDescriptor::host(3000, "127.0.0.1", 4000);
        let info = PortPresentation::derive(&served(3000), Some(&tunnel));
        assert_eq!(info.label, "3000:4000");

        // Same-port tunnels do not.
        let tunnel = TunnelDescriptor::host(3000, "127.0.0.1", 3000);
        let info = PortPresentation::derive(&served(3000), Some(&tunnel));
        assert_eq!(info.label, "3000");
    }

    #[test]
    fn test_label_with_unparseable_tunnel_address() {
        let tunnel = TunnelDescriptor {
            local_address: crate::domain::TunnelAddress::Url("garbage".to_string()),
            remote_port: 3000,
            public: false,
        };
        // No panic, no suffix: the remote port is simply absent.
        let info = PortPresentation::derive(&served(3000), Some(&tunnel));
        assert_eq!(info.label, "3000");
    }

    #[test]
    fn test_tooltip_formatting() {
        let status = PortStatus {
            name: Some("api".to_string()),
            description: Some("REST backend".to_string()),
            ..served(8080)
        };
        let info = PortPresentation::derive(&status, None);
        assert_eq!(info.tooltip, "api - REST backend");

        let status = PortStatus {
            description: Some("REST backend".to_string()),
            ..served(8080)
        };
        let info = PortPresentation::derive(&status, None);
        assert_eq!(info.tooltip, "REST backend");

        let info = PortPresentation::derive(&served(8080), None);
        assert_eq!(info.tooltip, "");
    }

    #[test]
    fn test_external_url_priority() {
        // Tunnel beats exposure.
        let status = PortStatus {
            exposed: exposed(PortVisibility::Public),
            ..served(3000)
        };
        let tunnel = TunnelDescriptor::host(3000, "127.0.0.1", 4000);
        let info = PortPresentation::derive(&status, Some(&tunnel));
        assert_eq!(info.external_url, "http://127.0.0.1:4000");

        // Exposure beats the localhost fallback.
        let info = PortPresentation::derive(&status, None);
        assert_eq!(info.external_url, "https://3000-ws.example.dev");

        // Fallback when neither is present.
        let info = PortPresentation::derive(&served(3000), None);
        assert_eq!(info.external_url, "http://localhost:3000");
        assert_eq!(info.local_url, "http://localhost:3000");
    }

    #[test]
    fn test_update_recomputes_in_full() {
        let mut record = PortRecord::new(served(3000), None);
        assert_eq!(record.info.icon_status, IconStatus::Detecting);
        assert!(!record.is_accessible_served());

        let status = PortStatus {
            exposed: exposed(PortVisibility::Private),
            ..served(3000)
        };
        record.update(status, None);
        assert_eq!(record.info.icon_status, IconStatus::Served);
        assert!(record.is_accessible_served());
        assert_eq!(record.info.context_value, "private-exposed-served-port");

        // Exposure withdrawn: no stale derived fields survive.
        record.update(served(3000), None);
        assert_eq!(record.info.icon_status, IconStatus::Detecting);
        assert_eq!(record.info.context_value, "served-port");
        assert_eq!(record.external_url(), "http://localhost:3000");
    }
}
