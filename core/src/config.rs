//! Runtime tuning knobs.
//!
//! Nothing here is persisted; port state is re-derived from the live status
//! feed after every restart.

use std::time::Duration;

/// Configuration for the status stream supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Fixed delay between resubscribe attempts. Default: 1s.
    ///
    /// The delay does not grow and retries are not capped: a dead feed
    /// degrades to a stale port list, never to a user-facing error.
    pub retry_delay: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Configuration for outbound mutation calls.
#[derive(Debug, Clone)]
pub struct CommandConfig {
    /// Deadline applied to every call to the remote agent. Default: 10s.
    pub deadline: Duration,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(10),
        }
    }
}
