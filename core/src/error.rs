//! Error types for the portsync-core library.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for portsync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while observing port status or dispatching commands.
#[derive(Error, Debug)]
pub enum Error {
    /// The status stream failed (connection lost, protocol error, ...).
    ///
    /// Recovered locally by the stream supervisor via indefinite retry;
    /// reconciliation never observes this as an error.
    #[error("status stream failure: {0}")]
    StatusStream(String),

    /// The operation was cancelled by the caller.
    ///
    /// A distinguished, expected termination - logged at debug level at
    /// most, never treated as a fault.
    #[error("operation cancelled")]
    Cancelled,

    /// A mutation call to the remote agent failed.
    #[error("command failed: {0}")]
    CommandFailed(String),

    /// A mutation call did not complete within its deadline.
    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// The awaited condition can no longer be satisfied (e.g. the port
    /// disappeared while waiting for its exposure).
    #[error("no longer resolvable: {0}")]
    Unresolvable(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if this error is a caller-initiated cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_is_distinguished() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::StatusStream("eof".to_string()).is_cancelled());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::DeadlineExceeded(Duration::from_secs(10));
        assert!(err.to_string().contains("deadline exceeded"));

        let err = Error::StatusStream("connection reset".to_string());
        assert_eq!(err.to_string(), "status stream failure: connection reset");
    }
}
