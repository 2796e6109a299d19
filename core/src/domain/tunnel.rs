//! Tunnel descriptor models.
//!
//! A tunnel is a host-side forwarding path that makes a sandboxed port
//! reachable from the user's local machine, independent of remote exposure.

use serde::{Deserialize, Serialize};

// ============================================================================
// TunnelVisibility
// ============================================================================

/// Who can reach the local end of a tunnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TunnelVisibility {
    /// Bound to localhost only.
    Host,
    /// Bound to all interfaces of the user's machine.
    Network,
}

// ============================================================================
// TunnelAddress
// ============================================================================

/// The local-side address of a tunnel.
///
/// The host reports either a structured host/port pair or an opaque URL
/// string; both forms occur in practice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TunnelAddress {
    /// Structured form, e.g. host `"127.0.0.1"`, port `4000`.
    Socket { host: String, port: u16 },
    /// Opaque URL string, e.g. `"http://127.0.0.1:4000"`.
    Url(String),
}

impl TunnelAddress {
    /// The port component of the address.
    ///
    /// String addresses are parsed as URLs; any parse failure yields `None`
    /// rather than an error, and callers must treat the port as optional.
    pub fn port(&self) -> Option<u16> {
        match self {
            TunnelAddress::Socket { port, .. } => Some(*port),
            TunnelAddress::Url(s) => url::Url::parse(s).ok().and_then(|u| u.port()),
        }
    }

    /// The address rendered as an `http://` URL.
    ///
    /// Addresses that already carry a scheme are returned as-is.
    pub fn to_http_url(&self) -> String {
        match self {
            TunnelAddress::Socket { host, port } => format!("http://{host}:{port}"),
            TunnelAddress::Url(s) => {
                if s.starts_with("http") {
                    s.clone()
                } else {
                    format!("http://{s}")
                }
            }
        }
    }
}

impl std::fmt::Display for TunnelAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TunnelAddress::Socket { host, port } => write!(f, "{host}:{port}"),
            TunnelAddress::Url(s) => write!(f, "{s}"),
        }
    }
}

// ============================================================================
// TunnelDescriptor
// ============================================================================

/// A currently active tunnel, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TunnelDescriptor {
    /// Where the tunnel listens on the user's machine.
    pub local_address: TunnelAddress,
    /// The sandboxed port the tunnel forwards to.
    pub remote_port: u16,
    /// Whether the local end is reachable from the network (vs. host-only).
    pub public: bool,
}

impl TunnelDescriptor {
    /// Host-only tunnel with a structured local address.
    pub fn host(remote_port: u16, local_host: impl Into<String>, local_port: u16) -> Self {
        Self {
            local_address: TunnelAddress::Socket {
                host: local_host.into(),
                port: local_port,
            },
            remote_port,
            public: false,
        }
    }

    /// Network-wide tunnel with a structured local address.
    pub fn network(remote_port: u16, local_host: impl Into<String>, local_port: u16) -> Self {
        Self {
            public: true,
            ..Self::host(remote_port, local_host, local_port)
        }
    }

    /// The local-side port, when it can be determined.
    pub fn local_port(&self) -> Option<u16> {
        self.local_address.port()
    }
}
