//! Error types for the networking crate.

use std::fmt;

use thiserror::Error;

use crate::dns::Endpoint;

/// Network-specific errors.
///
/// OS-level reasons are carried as strings so errors stay `Clone` and can be
/// handed to observers or logged after the originating `io::Error` is gone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The host name could not be resolved to an IPv4 address.
    #[error("failed to resolve hostname '{host}': {reason}")]
    Resolution {
        /// The name that was looked up.
        host: String,
        /// Why the lookup produced no address.
        reason: String,
    },

    /// A DNS resolver could not be set up.
    #[error("DNS resolver error: {0}")]
    Dns(String),

    /// The OS refused to allocate a socket.
    #[error("failed to create socket: {0}")]
    SocketCreation(String),

    /// A source port outside `0..=65535` was requested.
    #[error("source port {0} is outside the range 0..=65535")]
    InvalidSourcePort(i64),

    /// Binding to the requested source port failed.
    #[error("failed to bind to source port {port}: {reason}")]
    Bind {
        /// The requested local port.
        port: u16,
        /// The OS reason.
        reason: String,
    },

    /// The connect handshake failed.
    #[error("failed to connect to {endpoint}: {reason}")]
    Connect {
        /// The resolved destination.
        endpoint: Endpoint,
        /// The OS reason.
        reason: String,
    },

    /// `connect` was called while the client still holds a connection.
    #[error("client already holds a connection; close it first")]
    AlreadyConnected,

    /// An operation needed a connection but the client has none.
    #[error("client is not connected")]
    NotConnected,

    /// The receive thread could not be started.
    #[error("failed to start receive thread: {0}")]
    Spawn(String),

    /// The underlying write reported an error.
    #[error("send failed: {0}")]
    Send(String),

    /// Fewer bytes were written than requested.
    #[error("only {sent} bytes out of {requested} were sent")]
    PartialSend {
        /// Bytes accepted by the transport.
        sent: usize,
        /// Bytes the caller asked to send.
        requested: usize,
    },

    /// `close` was called on a client that is already closed.
    #[error("client is already closed")]
    AlreadyClosed,

    /// Releasing the socket descriptor failed.
    #[error("failed to close socket: {0}")]
    Close(String),
}

/// A specialized Result type for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Why a connection ended, as delivered to disconnect observers.
///
/// Receive-side failures never propagate as errors across the receive
/// thread boundary; they end the connection with one of these reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The peer performed an orderly shutdown (zero-length read).
    PeerClosed,
    /// Reading from the socket failed.
    ReadFailed(String),
    /// Waiting for readability failed.
    WaitFailed(String),
}

impl DisconnectReason {
    /// Whether the connection ended because of an I/O failure rather than
    /// an orderly peer close.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::PeerClosed)
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerClosed => write!(f, "peer closed"),
            Self::ReadFailed(reason) => write!(f, "read failed: {reason}"),
            Self::WaitFailed(reason) => write!(f, "wait for readability failed: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_send_message_reports_both_counts() {
        let err = NetworkError::PartialSend {
            sent: 3,
            requested: 10,
        };
        assert_eq!(err.to_string(), "only 3 bytes out of 10 were sent");
    }

    #[test]
    fn test_bind_message_carries_port() {
        let err = NetworkError::Bind {
            port: 4000,
            reason: "Address already in use".into(),
        };
        assert!(err.to_string().contains("4000"));
        assert!(err.to_string().contains("Address already in use"));
    }

    #[test]
    fn test_disconnect_reason_display() {
        assert_eq!(DisconnectReason::PeerClosed.to_string(), "peer closed");
        assert!(!DisconnectReason::PeerClosed.is_error());

        let reason = DisconnectReason::ReadFailed("Connection reset by peer".into());
        assert!(reason.is_error());
        assert_eq!(reason.to_string(), "read failed: Connection reset by peer");
    }
}
